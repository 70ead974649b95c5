//! Session store migration.
//!
//! The storefront keeps no tables of its own; carts, checkout progress and
//! sign-in identity live in `tower_sessions.session`.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors from the migrate command.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the session schema and table if they do not exist.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn sessions() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = bloom_storefront::db::create_pool(&SecretString::from(database_url)).await?;

    tracing::info!("Creating session store schema...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session store ready");
    Ok(())
}
