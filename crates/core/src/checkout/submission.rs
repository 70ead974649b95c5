//! Order submission lifecycle.
//!
//! ```text
//! Idle ──begin──▶ Submitting ──succeed──▶ Succeeded
//!   ▲                 │
//!   └──── reset ◀── fail ──▶ Failed
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::OrderId;

/// An attempted transition that the state machine does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} an order submission that is {from}")]
pub struct TransitionError {
    pub from: &'static str,
    pub action: &'static str,
}

/// Where a checkout's order submission currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    /// The order API call is in flight; the submit control stays disabled.
    Submitting,
    /// Terminal for the cart that was submitted.
    Succeeded { order_id: OrderId },
    Failed { reason: String },
}

impl SubmissionState {
    /// Short lowercase name of the state.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Start a submission.
    ///
    /// A failed attempt passes back through `Idle`, so resubmitting after a
    /// failure is allowed.
    ///
    /// # Errors
    ///
    /// Refuses while a submission is already in flight or after success.
    pub fn begin(&self) -> Result<Self, TransitionError> {
        match self {
            Self::Idle => Ok(Self::Submitting),
            Self::Failed { .. } => self.reset()?.begin(),
            _ => Err(self.refuse("begin")),
        }
    }

    /// Record the order id returned by the order API.
    ///
    /// # Errors
    ///
    /// Only valid while submitting.
    pub fn succeed(&self, order_id: OrderId) -> Result<Self, TransitionError> {
        match self {
            Self::Submitting => Ok(Self::Succeeded { order_id }),
            _ => Err(self.refuse("complete")),
        }
    }

    /// Record a failed order API call.
    ///
    /// # Errors
    ///
    /// Only valid while submitting.
    pub fn fail(&self, reason: impl Into<String>) -> Result<Self, TransitionError> {
        match self {
            Self::Submitting => Ok(Self::Failed {
                reason: reason.into(),
            }),
            _ => Err(self.refuse("fail")),
        }
    }

    /// Return a failed submission to `Idle`.
    ///
    /// # Errors
    ///
    /// Only valid from `Failed` (or `Idle`, which is a no-op).
    pub fn reset(&self) -> Result<Self, TransitionError> {
        match self {
            Self::Idle | Self::Failed { .. } => Ok(Self::Idle),
            _ => Err(self.refuse("reset")),
        }
    }

    /// The state for a freshly started cart.
    ///
    /// A succeeded submission ends its cart; the next cart starts from
    /// `Idle`. An in-flight submission is left alone.
    #[must_use]
    pub fn for_new_cart(self) -> Self {
        match self {
            Self::Submitting => Self::Submitting,
            _ => Self::Idle,
        }
    }

    const fn refuse(&self, action: &'static str) -> TransitionError {
        TransitionError {
            from: self.name(),
            action,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = SubmissionState::Idle.begin().unwrap();
        assert!(state.is_submitting());
        let state = state.succeed(OrderId::new(42)).unwrap();
        assert_eq!(
            state,
            SubmissionState::Succeeded {
                order_id: OrderId::new(42)
            }
        );
    }

    #[test]
    fn test_failure_allows_resubmission() {
        let failed = SubmissionState::Idle
            .begin()
            .unwrap()
            .fail("timeout")
            .unwrap();
        assert_eq!(failed.reset().unwrap(), SubmissionState::Idle);
        assert!(failed.begin().unwrap().is_submitting());
    }

    #[test]
    fn test_double_submit_is_refused() {
        let err = SubmissionState::Submitting.begin().unwrap_err();
        assert_eq!(err.from, "submitting");
        assert_eq!(
            err.to_string(),
            "cannot begin an order submission that is submitting"
        );
    }

    #[test]
    fn test_succeeded_is_terminal() {
        let done = SubmissionState::Succeeded {
            order_id: OrderId::new(1),
        };
        assert!(done.begin().is_err());
        assert!(done.reset().is_err());
        assert!(done.fail("late").is_err());
        assert_eq!(done.for_new_cart(), SubmissionState::Idle);
    }

    #[test]
    fn test_outcomes_require_submitting() {
        assert!(SubmissionState::Idle.succeed(OrderId::new(1)).is_err());
        assert!(SubmissionState::Idle.fail("x").is_err());
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_value(SubmissionState::Failed {
            reason: "declined".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "declined");
    }
}
