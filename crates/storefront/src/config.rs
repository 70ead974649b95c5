//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `CONTENT_API_URL` - GraphQL endpoint of the content API
//! - `COMMERCE_API_URL` - Base URL of the commerce backend (REST API lives under `/wp-json/wc/v3`)
//! - `COMMERCE_CONSUMER_KEY` - REST API consumer key
//! - `COMMERCE_CONSUMER_SECRET` - REST API consumer secret
//! - `GOOGLE_CLIENT_ID` - Google OAuth client ID
//! - `GOOGLE_CLIENT_SECRET` - Google OAuth client secret
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront, without a trailing slash
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Product catalog (GraphQL) configuration
    pub content: ContentApiConfig,
    /// Order backend (REST) configuration
    pub commerce: CommerceConfig,
    /// Google sign-in configuration
    pub google: GoogleConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. `production`)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Content API configuration.
#[derive(Debug, Clone)]
pub struct ContentApiConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
}

/// Commerce REST API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct CommerceConfig {
    /// Site base URL, without a trailing slash
    pub base_url: String,
    /// REST API consumer key
    pub consumer_key: String,
    /// REST API consumer secret
    pub consumer_secret: SecretString,
}

impl std::fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("base_url", &self.base_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

/// Google OAuth configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct GoogleConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_url("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let content = ContentApiConfig {
            endpoint: get_url("CONTENT_API_URL")?,
        };
        let commerce = CommerceConfig::from_env()?;
        let google = GoogleConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            content,
            commerce,
            google,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// OAuth redirect URI registered with Google.
    #[must_use]
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.base_url)
    }
}

impl CommerceConfig {
    /// Load the commerce backend settings on their own (used by `bloom-cli orders`).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing or the secret is weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_url("COMMERCE_API_URL")?,
            consumer_key: get_required_env("COMMERCE_CONSUMER_KEY")?,
            consumer_secret: get_validated_secret("COMMERCE_CONSUMER_SECRET")?,
        })
    }
}

impl GoogleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("GOOGLE_CLIENT_ID")?,
            client_secret: get_validated_secret("GOOGLE_CLIENT_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required absolute URL, returned without a trailing slash.
fn get_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    parse_base_url(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}

fn parse_base_url(value: &str) -> Result<String, String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a sampling rate between 0 and 1.
fn get_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let raw = get_env_or_default(key, default);
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0 and 1 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            content: ContentApiConfig {
                endpoint: "http://localhost:8080/graphql".to_string(),
            },
            commerce: CommerceConfig {
                base_url: "http://localhost:8080".to_string(),
                consumer_key: "ck_live_key".to_string(),
                consumer_secret: SecretString::from("cs_super_private_value"),
            },
            google: GoogleConfig {
                client_id: "client_id_value".to_string(),
                client_secret: SecretString::from("google_private_value"),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_parse_base_url() {
        assert_eq!(
            parse_base_url("https://shop.example.com/").unwrap(),
            "https://shop.example.com"
        );
        assert!(parse_base_url("shop.example.com").is_err());
        assert!(parse_base_url("ftp://shop.example.com").is_err());
    }

    #[test]
    fn test_socket_addr_and_redirect() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
        assert_eq!(
            config.oauth_redirect_uri(),
            "http://localhost:3000/auth/callback"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{:?} {:?}", config.commerce, config.google);

        assert!(debug_output.contains("ck_live_key"));
        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("cs_super_private_value"));
        assert!(!debug_output.contains("google_private_value"));
    }
}
