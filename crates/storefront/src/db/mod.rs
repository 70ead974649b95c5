//! Database access for the storefront `PostgreSQL`.
//!
//! The commerce backend is the source of truth for products and orders. The
//! only local table is `tower_sessions.session`, which holds each visitor's
//! cart, checkout progress and sign-in identity.
//!
//! # Migrations
//!
//! The session schema is created by:
//! ```bash
//! cargo run -p bloom-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Check that the database answers a trivial query.
///
/// # Errors
///
/// Returns `sqlx::Error` if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
