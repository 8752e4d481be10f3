//! Installed shops and their access tokens.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::PgPool;

use launchkit_core::ShopDomain;

use super::RepositoryError;

/// An installed shop.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopRecord {
    pub shop: ShopDomain,
    pub access_token: SecretString,
    pub scope: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for ShopRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopRecord")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Internal row type for `PostgreSQL` queries.
#[derive(sqlx::FromRow)]
struct ShopRow {
    shop: ShopDomain,
    access_token: String,
    scope: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShopRow> for ShopRecord {
    fn from(row: ShopRow) -> Self {
        Self {
            shop: row.shop,
            access_token: SecretString::from(row.access_token),
            scope: row.scope,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for installed shops.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a shop by domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, shop: &ShopDomain) -> Result<Option<ShopRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(
            r"
            SELECT shop, access_token, scope, created_at, updated_at
            FROM shops
            WHERE shop = $1
            ",
        )
        .bind(shop)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ShopRecord::from))
    }

    /// Save or replace the token for a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        scope: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shops (shop, access_token, scope)
            VALUES ($1, $2, $3)
            ON CONFLICT (shop) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                scope = EXCLUDED.scope,
                updated_at = now()
            ",
        )
        .bind(shop)
        .bind(access_token)
        .bind(scope)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Forget a shop. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, shop: &ShopDomain) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shops WHERE shop = $1")
            .bind(shop)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check if a shop is installed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, shop: &ShopDomain) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE shop = $1)")
                .bind(shop)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }
}
