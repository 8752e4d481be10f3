//! Shop connection status and history.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use launchkit_core::ShopDomain;

use crate::db::{RunRecord, RunRepository, ShopRepository};
use crate::error::AppError;
use crate::state::AppState;

use super::ShopQuery;

/// Most runs returned by `/api/runs`.
const MAX_RUNS: i64 = 100;
const DEFAULT_RUNS: i64 = 20;

/// Build the shops router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shops/me", get(me))
        .route("/api/shops/logout", delete(logout))
        .route("/api/runs", get(runs))
}

/// Response for the connection status endpoint.
#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub shop: ShopDomain,
    pub connected: bool,
}

/// Response for logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
    pub message: &'static str,
}

/// Query for the runs listing.
#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    pub shop: String,
    pub limit: Option<i64>,
}

/// GET /api/shops/me - Whether the shop has installed the app.
#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<ConnectionStatus>, AppError> {
    let shop = ShopDomain::parse(&query.shop)?;
    let connected = ShopRepository::new(state.pool()).exists(&shop).await?;
    Ok(Json(ConnectionStatus { shop, connected }))
}

/// DELETE /api/shops/logout - Forget the shop's token.
#[instrument(skip(state))]
async fn logout(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<LogoutResponse>, AppError> {
    let shop = ShopDomain::parse(&query.shop)?;
    let removed = ShopRepository::new(state.pool()).delete(&shop).await?;
    tracing::info!(shop = %shop, removed, "Shop logged out");

    Ok(Json(LogoutResponse {
        ok: true,
        message: "Logged out successfully",
    }))
}

/// GET /api/runs - Recent changes written to the shop, newest first.
#[instrument(skip(state))]
async fn runs(
    State(state): State<AppState>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<Vec<RunRecord>>, AppError> {
    let shop = ShopDomain::parse(&query.shop)?;
    let limit = query.limit.unwrap_or(DEFAULT_RUNS).clamp(1, MAX_RUNS);
    let runs = RunRepository::new(state.pool())
        .list_recent(&shop, limit)
        .await?;
    Ok(Json(runs))
}
