//! `PostgreSQL` persistence.
//!
//! ## Tables
//!
//! - `shops` - installed shops and their offline access tokens
//! - `oauth_states` - one-time install nonces
//! - `runs` - audit trail of changes written to shops
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! lk-cli migrate
//! ```

pub mod oauth_states;
pub mod runs;
pub mod shops;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use oauth_states::{OAuthStateRepository, STATE_TTL};
pub use runs::{RunKind, RunRecord, RunRepository};
pub use shops::{ShopRecord, ShopRepository};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Convert a Shopify ID to the `BIGINT` we store.
fn to_db_id(id: u64) -> Result<i64, RepositoryError> {
    i64::try_from(id).map_err(|_| RepositoryError::DataCorruption(format!("id {id} exceeds BIGINT")))
}
