//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! lk-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/server/migrations/` and are embedded in
//! the binary at build time.

use launchkit_server::db;
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if `DATABASE_URL` is unset, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
