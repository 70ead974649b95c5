//! Google sign-in route handlers.
//!
//! - Login: stores a CSRF state and redirects to Google's consent page
//! - Callback: verifies the state, exchanges the code and stores the identity
//! - Logout: ends the session, which also empties the cart

use axum::{
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::cart::CART_UPDATED;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::google::generate_state;
use crate::middleware::set_current_user;
use crate::models::session_keys;
use crate::routes::cart::HX_TRIGGER;
use crate::state::AppState;

/// Length of the OAuth `state` parameter.
const STATE_LENGTH: usize = 32;

/// Query parameters from the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
}

/// Start Google sign-in.
///
/// # Route
///
/// `GET /auth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_state(STATE_LENGTH);

    if let Err(e) = session.insert(session_keys::OAUTH_STATE, &oauth_state).await {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    let redirect_uri = state.config().oauth_redirect_uri();
    let auth_url = state.google().authorization_url(&redirect_uri, &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the OAuth callback.
///
/// # Route
///
/// `GET /auth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        tracing::warn!("Google OAuth error: {}", error);
        return Redirect::to("/?error=sign_in_denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return Redirect::to("/?error=missing_code").into_response();
    };

    let stored_state: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.is_none() || stored_state != query.state {
        tracing::warn!("OAuth state mismatch");
        return Redirect::to("/?error=invalid_state").into_response();
    }

    let redirect_uri = state.config().oauth_redirect_uri();
    let user = match state.google().sign_in(&code, &redirect_uri).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Google sign-in failed: {}", e);
            return Redirect::to("/?error=sign_in_failed").into_response();
        }
    };

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!("Failed to store signed-in user: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(email_domain = %user.email.domain(), "customer signed in");

    Redirect::to("/").into_response()
}

/// Sign out. The whole session is discarded, including the cart.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session on logout: {}", e);
    }
    clear_sentry_user();
    state.events().notify();

    (
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        Redirect::to("/"),
    )
        .into_response()
}
