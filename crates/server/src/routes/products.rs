//! Product listing passthrough.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

use super::ConnectedShop;

const DEFAULT_LIMIT: u32 = 50;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/products", get(list))
}

/// Query for the product list.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub shop: String,
    pub limit: Option<u32>,
}

/// GET /api/products - Shopify's product list, unchanged.
#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Value>, AppError> {
    let connected = ConnectedShop::load(&state, &query.shop).await?;
    let products = state
        .shopify()
        .list_products(
            &connected.shop,
            connected.token(),
            query.limit.unwrap_or(DEFAULT_LIMIT),
        )
        .await
        .map_err(|e| AppError::shopify(&connected.shop, e))?;
    Ok(Json(products))
}
