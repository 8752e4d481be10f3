//! Listing optimisation: generate a suggestion, then apply it.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use launchkit_core::ingest::prompt::{PRODUCT_TEMPLATE, product_prompt};
use launchkit_core::{ProductSuggestion, Usage, ingest, revalidate};

use crate::db::RunKind;
use crate::error::AppError;
use crate::shopify::{DiscountCode, NewPriceRule, ProductUpdate};
use crate::state::AppState;

use super::{ConnectedShop, record_run};

/// Build the generation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/test-claude", get(test_claude))
        .route("/api/generate", post(generate))
        .route("/api/apply", post(apply))
}

/// Response for the connectivity check.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PingResponse {
    Ok {
        success: bool,
        message: String,
        model: String,
        usage: Option<Usage>,
    },
    Failed {
        success: bool,
        error: String,
    },
}

/// Request for a listing suggestion.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub shop: String,
    pub product_id: u64,
}

/// The product as fetched plus the validated suggestion.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub product: Value,
    pub suggestion: ProductSuggestion,
}

/// Request to apply a suggestion.
///
/// `suggestion` is whatever the frontend posts back, possibly edited by the
/// merchant, so it is validated again before anything is written.
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub shop: String,
    pub product_id: u64,
    pub suggestion: Value,
}

/// Result of applying a suggestion.
#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub ok: bool,
    pub product_id: u64,
    pub price_rule_id: u64,
    pub discount_code: DiscountCode,
}

/// GET /api/test-claude - Send the ping prompt and report the outcome.
#[instrument(skip(state))]
async fn test_claude(State(state): State<AppState>) -> Json<PingResponse> {
    match state.claude().ping().await {
        Ok(reply) => Json(PingResponse::Ok {
            success: true,
            message: reply.text,
            model: reply.model_id,
            usage: reply.usage,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Claude connectivity check failed");
            Json(PingResponse::Failed {
                success: false,
                error: e.to_string(),
            })
        }
    }
}

/// POST /api/generate - Ask the model for an optimised listing.
#[instrument(skip(state, body), fields(product_id = body.product_id))]
async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let connected = ConnectedShop::load(&state, &body.shop).await?;
    let product = state
        .shopify()
        .get_product(&connected.shop, connected.token(), body.product_id)
        .await
        .map_err(|e| AppError::shopify(&connected.shop, e))?;

    let reply = state
        .claude()
        .complete(product_prompt(&product), PRODUCT_TEMPLATE.max_tokens)
        .await?;
    let suggestion: ProductSuggestion = ingest(&reply)?;

    tracing::info!(shop = %connected.shop, discount_code = suggestion.discount_code(), "Generated suggestion");
    Ok(Json(GenerateResponse {
        product,
        suggestion,
    }))
}

/// POST /api/apply - Update the product and create its launch discount.
#[instrument(skip(state, body), fields(product_id = body.product_id))]
async fn apply(
    State(state): State<AppState>,
    Json(body): Json<ApplyRequest>,
) -> Result<Json<ApplyResponse>, AppError> {
    let suggestion: ProductSuggestion =
        revalidate(body.suggestion).map_err(AppError::InvalidPayload)?;
    let connected = ConnectedShop::load(&state, &body.shop).await?;
    let shop = &connected.shop;
    let shopify = state.shopify();

    shopify
        .update_product(
            shop,
            connected.token(),
            &ProductUpdate::from_suggestion(body.product_id, &suggestion),
        )
        .await
        .map_err(|e| AppError::shopify(shop, e))?;

    let rule = NewPriceRule::launch(
        suggestion.discount_code(),
        suggestion.discount_percent(),
        Utc::now(),
    );
    let price_rule = shopify
        .create_price_rule(shop, connected.token(), &rule)
        .await
        .map_err(|e| AppError::shopify(shop, e))?;
    let discount_code = shopify
        .create_discount_code(
            shop,
            connected.token(),
            price_rule.id,
            suggestion.discount_code(),
        )
        .await
        .map_err(|e| AppError::shopify(shop, e))?;

    record_run(&state, shop, Some(body.product_id), RunKind::Suggestion).await;
    tracing::info!(shop = %shop, price_rule_id = price_rule.id, "Applied suggestion");

    Ok(Json(ApplyResponse {
        ok: true,
        product_id: body.product_id,
        price_rule_id: price_rule.id,
        discount_code,
    }))
}
