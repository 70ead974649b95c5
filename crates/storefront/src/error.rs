//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Error bodies are JSON: `{"error": "..."}`, plus `fields` for validation
//! failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use bloom_core::{CartError, ValidationErrors};

use crate::cart::{CartUpdateError, StoreError};
use crate::catalog::CatalogError;
use crate::checkout::SubmitError;
use crate::commerce::CommerceError;
use crate::google::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Checkout form has invalid fields.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session read/write failed.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// Content API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Commerce API operation failed.
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Sign-in failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with work already in progress.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CartUpdateError> for AppError {
    fn from(err: CartUpdateError) -> Self {
        match err {
            CartUpdateError::Cart(e) => Self::Cart(e),
            CartUpdateError::Store(e) => Self::Store(e),
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(e) => Self::Validation(e),
            SubmitError::EmptyCart => Self::BadRequest("cart is empty".to_string()),
            SubmitError::AlreadySubmitting(e) => Self::Conflict(e.to_string()),
            SubmitError::Rejected(e) => Self::Commerce(e),
            SubmitError::Store(e) => Self::Store(e),
        }
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Cart(CartError::LineNotFound(_))
            | Self::Catalog(CatalogError::NotFound(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::InvalidQuantity(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Catalog(_) | Self::Commerce(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Validation(errors) => json!({
                "error": "Please correct the highlighted fields",
                "fields": errors,
            }),
            Self::Cart(CartError::LineNotFound(_)) => json!({ "error": "line item not found" }),
            Self::Catalog(CatalogError::NotFound(msg)) => json!({ "error": msg }),
            Self::Store(_) | Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Catalog(_) => json!({ "error": "External service error" }),
            Self::Commerce(_) => json!({ "error": "Order service unavailable, please try again" }),
            Self::Auth(_) => json!({ "error": "Sign-in failed" }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful sign-in to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bloom_core::LineItemId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        let mut errors = ValidationErrors::default();
        errors.push("city", "City is required");

        assert_eq!(
            get_status(AppError::Validation(errors)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::LineNotFound(LineItemId::generate()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::InvalidQuantity(0))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Catalog(CatalogError::NotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Commerce(CommerceError::Api {
                status: 500,
                message: "boom".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_submit_error_mapping() {
        assert!(matches!(
            AppError::from(SubmitError::EmptyCart),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(SubmitError::Rejected(CommerceError::Api {
                status: 503,
                message: "down".to_string()
            })),
            AppError::Commerce(_)
        ));
    }
}
