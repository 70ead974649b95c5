//! Google sign-in (OAuth 2.0 authorization-code flow).
//!
//! The storefront only needs the customer's identity: the profile id, name,
//! verified email and picture. Tokens are used once to read the profile and
//! are never stored.

use std::sync::Arc;

use rand::Rng;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use bloom_core::Email;

use crate::config::GoogleConfig;
use crate::models::CurrentUser;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors from the sign-in flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("profile request failed: {0}")]
    Profile(String),

    #[error("account email is not verified")]
    UnverifiedEmail,

    #[error("account email is invalid: {0}")]
    InvalidEmail(#[from] bloom_core::EmailError),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    picture: Option<String>,
}

impl TryFrom<UserInfo> for CurrentUser {
    type Error = AuthError;

    fn try_from(info: UserInfo) -> Result<Self, Self::Error> {
        if !info.email_verified {
            return Err(AuthError::UnverifiedEmail);
        }
        let email = Email::parse(info.email.as_deref().unwrap_or_default())?;
        Ok(Self {
            id: info.sub,
            name: info.name,
            email,
            picture: info.picture,
        })
    }
}

/// Generate a cryptographically secure random string.
#[must_use]
pub fn generate_state(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&b| char::from(b))
        .collect()
}

/// Client for Google's OAuth endpoints.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for GoogleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleClient")
            .field("client_id", &self.inner.client_id)
            .finish_non_exhaustive()
    }
}

impl GoogleClient {
    #[must_use]
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            inner: Arc::new(GoogleClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
            }),
        }
    }

    /// The consent page URL to redirect the customer to.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}&\
            prompt=select_account",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code and read the signed-in profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the code exchange or the profile request fails, or
    /// if the account has no verified email.
    #[instrument(skip(self, code))]
    pub async fn sign_in(&self, code: &str, redirect_uri: &str) -> Result<CurrentUser, AuthError> {
        let access_token = self.exchange_code(code, redirect_uri).await?;
        self.user_info(&access_token).await
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(TOKEN_URL).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange(text));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn user_info(&self, access_token: &str) -> Result<CurrentUser, AuthError> {
        let response = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Profile(text));
        }

        let info: UserInfo = response.json().await?;
        CurrentUser::try_from(info)
    }
}
