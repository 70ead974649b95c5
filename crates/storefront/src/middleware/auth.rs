//! Sign-in extractors.
//!
//! Checkout and order history require a signed-in customer. Browsing and the
//! cart do not.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in customer.
///
/// Page requests are redirected to the login flow; `/api/*` requests get a
/// 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when sign-in is required but the customer is not signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for page requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Sign in to continue" })),
            )
                .into_response(),
        }
    }
}

async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get(session_keys::CURRENT_USER)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "failed to read signed-in user"))
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        // Nested routers strip their prefix from `parts.uri`
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |original| original.0.path());

        let user = current_user(session).await.ok_or_else(|| {
            if path.starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the signed-in customer.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the signed-in customer in the session.
///
/// The session id is cycled first so an id issued before sign-in cannot be
/// reused afterwards.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}
