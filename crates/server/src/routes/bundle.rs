//! Bundles: propose a listing for two products, then create it.

use axum::{Json, Router, extract::State, routing::post};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use launchkit_core::ingest::prompt::{BUNDLE_TEMPLATE, bundle_prompt};
use launchkit_core::{BundleProposal, bundle_price, ingest, parse_price, revalidate};

use crate::db::RunKind;
use crate::error::AppError;
use crate::shopify::{
    NewImage, NewMetafield, NewProduct, first_image_src, first_variant_price, product_id,
};
use crate::state::AppState;

use super::{ConnectedShop, record_run};

/// Build the bundle router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/generate-bundle", post(generate_bundle))
        .route("/api/create-bundle", post(create_bundle))
}

/// Request for a bundle proposal.
#[derive(Debug, Deserialize)]
pub struct GenerateBundleRequest {
    pub shop: String,
    pub product_a_id: u64,
    pub product_b_id: u64,
}

/// Both products as fetched plus the validated proposal.
#[derive(Debug, Serialize)]
pub struct GenerateBundleResponse {
    pub product_a: Value,
    pub product_b: Value,
    pub bundle: BundleProposal,
}

/// Request to create a bundle product.
#[derive(Debug, Deserialize)]
pub struct CreateBundleRequest {
    pub shop: String,
    pub product_a: Value,
    pub product_b: Value,
    pub bundle: Value,
}

/// The created product and its computed price.
#[derive(Debug, Serialize)]
pub struct CreateBundleResponse {
    pub created_product: Value,
    pub bundle_price: Decimal,
}

/// POST /api/generate-bundle - Ask the model for a bundle listing.
#[instrument(skip(state, body), fields(product_a_id = body.product_a_id, product_b_id = body.product_b_id))]
async fn generate_bundle(
    State(state): State<AppState>,
    Json(body): Json<GenerateBundleRequest>,
) -> Result<Json<GenerateBundleResponse>, AppError> {
    if body.product_a_id == body.product_b_id {
        return Err(AppError::BadRequest(
            "choose two different products".to_string(),
        ));
    }

    let connected = ConnectedShop::load(&state, &body.shop).await?;
    let shop = &connected.shop;
    let shopify = state.shopify();

    let (product_a, product_b) = tokio::try_join!(
        shopify.get_product(shop, connected.token(), body.product_a_id),
        shopify.get_product(shop, connected.token(), body.product_b_id),
    )
    .map_err(|e| AppError::shopify(shop, e))?;

    let reply = state
        .claude()
        .complete(
            bundle_prompt(&product_a, &product_b),
            BUNDLE_TEMPLATE.max_tokens,
        )
        .await?;
    let bundle: BundleProposal = ingest(&reply)?;

    tracing::info!(shop = %shop, title = bundle.title(), "Generated bundle proposal");
    Ok(Json(GenerateBundleResponse {
        product_a,
        product_b,
        bundle,
    }))
}

/// POST /api/create-bundle - Create the bundle product in the shop.
#[instrument(skip(state, body))]
async fn create_bundle(
    State(state): State<AppState>,
    Json(body): Json<CreateBundleRequest>,
) -> Result<Json<CreateBundleResponse>, AppError> {
    let bundle: BundleProposal = revalidate(body.bundle).map_err(AppError::InvalidPayload)?;
    let price = combined_price(&body.product_a, &body.product_b, &bundle)?;
    let images = [&body.product_a, &body.product_b]
        .into_iter()
        .filter_map(first_image_src)
        .map(|src| NewImage {
            src: src.to_string(),
        })
        .collect();

    let connected = ConnectedShop::load(&state, &body.shop).await?;
    let shop = &connected.shop;

    let created = state
        .shopify()
        .create_product(shop, connected.token(), &NewProduct::bundle(&bundle, price, images))
        .await
        .map_err(|e| AppError::shopify(shop, e))?;
    let created_id = product_id(&created);

    match (created_id, product_id(&body.product_a), product_id(&body.product_b)) {
        (Some(bundle_id), Some(a), Some(b)) => {
            let metafield = NewMetafield::bundle_components(bundle_id, a, b, bundle.bundle_notes());
            if let Err(e) = state
                .shopify()
                .create_metafield(shop, connected.token(), &metafield)
                .await
            {
                tracing::warn!(error = %e, bundle_id, "Bundle metafield creation failed");
            }
        }
        _ => tracing::warn!("Skipping bundle metafield: product IDs missing"),
    }

    record_run(&state, shop, created_id, RunKind::Bundle).await;
    tracing::info!(shop = %shop, bundle_id = ?created_id, %price, "Created bundle");

    Ok(Json(CreateBundleResponse {
        created_product: serde_json::json!({ "product": created }),
        bundle_price: price,
    }))
}

/// Sum of both first-variant prices less the bundle discount, to the cent.
fn combined_price(
    product_a: &Value,
    product_b: &Value,
    bundle: &BundleProposal,
) -> Result<Decimal, AppError> {
    let price_of = |product: &Value, label: &str| -> Result<Decimal, AppError> {
        let raw = first_variant_price(product).ok_or_else(|| {
            AppError::BadRequest(format!("product {label} has no variant price"))
        })?;
        parse_price(raw).map_err(|e| AppError::BadRequest(format!("product {label}: {e}")))
    };

    bundle_price(
        price_of(product_a, "A")?,
        price_of(product_b, "B")?,
        bundle.bundle_price_percent_off(),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn proposal(percent_off: f64) -> BundleProposal {
        revalidate(json!({
            "title": "Mug & Coaster Set",
            "description_html": "<p>Both.</p>",
            "tags": "bundle",
            "bundle_price_percent_off": percent_off,
            "bundle_notes": ""
        }))
        .expect("valid proposal")
    }

    #[test]
    fn test_combined_price_rounds_to_cents() {
        let a = json!({"variants": [{"price": "19.99"}]});
        let b = json!({"variants": [{"price": "10.01"}]});
        let price = combined_price(&a, &b, &proposal(10.0)).expect("price");
        assert_eq!(price.to_string(), "27.00");
    }

    #[test]
    fn test_combined_price_requires_variant_prices() {
        let a = json!({"variants": []});
        let b = json!({"variants": [{"price": "10.00"}]});
        let err = combined_price(&a, &b, &proposal(10.0)).expect_err("no price");
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("product A")));
    }

    #[test]
    fn test_combined_price_rejects_garbage_price() {
        let a = json!({"variants": [{"price": "ten"}]});
        let b = json!({"variants": [{"price": "10.00"}]});
        assert!(combined_price(&a, &b, &proposal(10.0)).is_err());
    }
}
