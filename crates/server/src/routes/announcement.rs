//! Launch announcement snippets for the live theme.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use launchkit_core::ingest::prompt::{ANNOUNCEMENT_TEMPLATE, announcement_prompt};
use launchkit_core::{Announcement, ingest, revalidate};

use crate::db::RunKind;
use crate::error::AppError;
use crate::shopify::snippet_key;
use crate::state::AppState;

use super::{ConnectedShop, record_run};

/// Build the announcement router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/generate-announcement", post(generate_announcement))
        .route("/api/apply-announcement", post(apply_announcement))
}

/// Request for an announcement snippet.
#[derive(Debug, Deserialize)]
pub struct GenerateAnnouncementRequest {
    pub shop: String,
    pub product_id: u64,
    /// Banner copy from an earlier suggestion, if the merchant has one.
    pub banner_copy: Option<String>,
}

/// The product as fetched plus the validated snippet.
#[derive(Debug, Serialize)]
pub struct GenerateAnnouncementResponse {
    pub product: Value,
    pub announcement: Announcement,
}

/// Request to write a snippet into the live theme.
#[derive(Debug, Deserialize)]
pub struct ApplyAnnouncementRequest {
    pub shop: String,
    pub announcement: Value,
    pub product_id: Option<u64>,
}

/// Where the snippet was written.
#[derive(Debug, Serialize)]
pub struct ApplyAnnouncementResponse {
    pub ok: bool,
    pub theme_id: u64,
    pub key: String,
}

/// POST /api/generate-announcement - Ask the model for a Liquid snippet.
#[instrument(skip(state, body), fields(product_id = body.product_id))]
async fn generate_announcement(
    State(state): State<AppState>,
    Json(body): Json<GenerateAnnouncementRequest>,
) -> Result<Json<GenerateAnnouncementResponse>, AppError> {
    let connected = ConnectedShop::load(&state, &body.shop).await?;
    let product = state
        .shopify()
        .get_product(&connected.shop, connected.token(), body.product_id)
        .await
        .map_err(|e| AppError::shopify(&connected.shop, e))?;

    let reply = state
        .claude()
        .complete(
            announcement_prompt(&product, body.banner_copy.as_deref()),
            ANNOUNCEMENT_TEMPLATE.max_tokens,
        )
        .await?;
    let announcement: Announcement = ingest(&reply)?;

    tracing::info!(shop = %connected.shop, filename = announcement.filename(), "Generated announcement");
    Ok(Json(GenerateAnnouncementResponse {
        product,
        announcement,
    }))
}

/// POST /api/apply-announcement - Write the snippet to the main theme.
#[instrument(skip(state, body))]
async fn apply_announcement(
    State(state): State<AppState>,
    Json(body): Json<ApplyAnnouncementRequest>,
) -> Result<Json<ApplyAnnouncementResponse>, AppError> {
    let announcement: Announcement =
        revalidate(body.announcement).map_err(AppError::InvalidPayload)?;
    let key = snippet_key(announcement.filename())?;

    let connected = ConnectedShop::load(&state, &body.shop).await?;
    let shop = &connected.shop;
    let shopify = state.shopify();

    let theme = shopify
        .main_theme(shop, connected.token())
        .await
        .map_err(|e| AppError::shopify(shop, e))?;
    let asset = shopify
        .put_asset(shop, connected.token(), theme.id, &key, announcement.content())
        .await
        .map_err(|e| AppError::shopify(shop, e))?;

    record_run(&state, shop, body.product_id, RunKind::Announcement).await;
    tracing::info!(shop = %shop, theme_id = theme.id, key = %asset.key, "Wrote announcement snippet");

    Ok(Json(ApplyAnnouncementResponse {
        ok: true,
        theme_id: theme.id,
        key: asset.key,
    }))
}
