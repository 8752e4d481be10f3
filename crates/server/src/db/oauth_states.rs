//! One-time OAuth `state` nonces.
//!
//! A nonce is issued when the install URL is built and consumed by the
//! callback. Consumption deletes the row, so a replayed callback finds
//! nothing.

use std::time::Duration;

use sqlx::PgPool;

use launchkit_core::ShopDomain;

use super::RepositoryError;

/// How long an issued nonce stays valid.
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Repository for OAuth nonces.
pub struct OAuthStateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OAuthStateRepository<'a> {
    /// Create a new OAuth state repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Issue a fresh nonce bound to `shop`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn issue(&self, shop: &ShopDomain) -> Result<String, RepositoryError> {
        let state = uuid::Uuid::new_v4().simple().to_string();

        sqlx::query("INSERT INTO oauth_states (state, shop) VALUES ($1, $2)")
            .bind(&state)
            .bind(shop)
            .execute(self.pool)
            .await?;

        Ok(state)
    }

    /// Consume a nonce. Returns `true` only if it existed, was issued for
    /// `shop`, and has not expired. The nonce is gone afterwards either way.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume(&self, state: &str, shop: &ShopDomain) -> Result<bool, RepositoryError> {
        let valid: Option<bool> = sqlx::query_scalar(
            r"
            DELETE FROM oauth_states
            WHERE state = $1
            RETURNING shop = $2 AND created_at > now() - make_interval(secs => $3)
            ",
        )
        .bind(state)
        .bind(shop)
        .bind(STATE_TTL.as_secs_f64())
        .fetch_optional(self.pool)
        .await?;

        Ok(valid.unwrap_or(false))
    }

    /// Delete expired nonces. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM oauth_states WHERE created_at <= now() - make_interval(secs => $1)",
        )
        .bind(STATE_TTL.as_secs_f64())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
