//! Cross-request submission lock.
//!
//! The submission state lives in the session record, which each request
//! loads on its own. Two overlapping requests from the same browser would
//! both see `idle`, so the process also tracks which sessions have an order
//! call outstanding.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Sessions with a submission currently in progress.
#[derive(Debug, Default)]
pub struct InFlightSubmissions {
    sessions: Mutex<HashSet<String>>,
}

impl InFlightSubmissions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the submission slot for a session.
    ///
    /// Returns `None` if another request already holds it. The slot is
    /// released when the returned guard is dropped.
    #[must_use]
    pub fn try_begin(&self, session_key: impl Into<String>) -> Option<SubmissionGuard<'_>> {
        let key = session_key.into();
        if !self.sessions.lock().insert(key.clone()) {
            tracing::debug!(session = %key, "submission already in flight");
            return None;
        }
        Some(SubmissionGuard { owner: self, key })
    }

    /// Whether a session currently holds the slot.
    #[must_use]
    pub fn contains(&self, session_key: &str) -> bool {
        self.sessions.lock().contains(session_key)
    }
}

/// Held for the duration of one submission.
#[derive(Debug)]
pub struct SubmissionGuard<'a> {
    owner: &'a InFlightSubmissions,
    key: String,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.owner.sessions.lock().remove(&self.key);
    }
}
