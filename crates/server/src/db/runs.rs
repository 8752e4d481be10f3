//! Audit trail of changes written to shops.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use launchkit_core::ShopDomain;

use super::{RepositoryError, to_db_id};

/// What a run wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// A product suggestion was applied.
    Suggestion,
    /// A bundle product was created.
    Bundle,
    /// An announcement snippet was written to the theme.
    Announcement,
}

impl RunKind {
    /// Value stored in the `kind` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Suggestion => "suggestion",
            Self::Bundle => "bundle",
            Self::Announcement => "announcement",
        }
    }
}

impl std::str::FromStr for RunKind {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suggestion" => Ok(Self::Suggestion),
            "bundle" => Ok(Self::Bundle),
            "announcement" => Ok(Self::Announcement),
            other => Err(RepositoryError::DataCorruption(format!(
                "unknown run kind: {other}"
            ))),
        }
    }
}

/// A recorded run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub shop: ShopDomain,
    pub product_id: Option<i64>,
    pub kind: RunKind,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct RunRow {
    id: Uuid,
    shop: ShopDomain,
    product_id: Option<i64>,
    kind: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RunRow> for RunRecord {
    type Error = RepositoryError;

    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            shop: row.shop,
            product_id: row.product_id,
            kind: row.kind.parse()?,
            created_at: row.created_at,
        })
    }
}

/// Repository for runs.
pub struct RunRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RunRepository<'a> {
    /// Create a new run repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a run.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if `product_id` does not fit
    /// a `BIGINT`, or `RepositoryError::Database` if the insert fails.
    pub async fn record(
        &self,
        shop: &ShopDomain,
        product_id: Option<u64>,
        kind: RunKind,
    ) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        let product_id = product_id.map(to_db_id).transpose()?;

        sqlx::query("INSERT INTO runs (id, shop, product_id, kind) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(shop)
            .bind(product_id)
            .bind(kind.as_str())
            .execute(self.pool)
            .await?;

        Ok(id)
    }

    /// Most recent runs for a shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(
        &self,
        shop: &ShopDomain,
        limit: i64,
    ) -> Result<Vec<RunRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, RunRow>(
            r"
            SELECT id, shop, product_id, kind, created_at
            FROM runs
            WHERE shop = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(shop)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(RunRecord::try_from).collect()
    }
}
