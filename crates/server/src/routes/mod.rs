//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness
//! GET    /health/ready                - Readiness (database ping)
//!
//! # Install
//! GET    /auth/install?shop=          - Build the OAuth install URL
//! GET    /auth/callback               - OAuth callback, redirects to the frontend
//!
//! # Shops
//! GET    /api/shops/me?shop=          - Connection status
//! DELETE /api/shops/logout?shop=      - Forget a shop
//! GET    /api/runs?shop=              - Recent changes written to a shop
//!
//! # Products and generation
//! GET    /api/products?shop=&limit=   - Shopify product list
//! GET    /api/test-claude             - Model connectivity check
//! POST   /api/generate                - Listing suggestion for one product
//! POST   /api/apply                   - Apply a suggestion and create its discount
//! POST   /api/generate-bundle         - Bundle proposal for two products
//! POST   /api/create-bundle           - Create the bundle product
//! POST   /api/generate-announcement   - Announcement snippet for one product
//! POST   /api/apply-announcement      - Write the snippet to the live theme
//! POST   /api/agent-intent            - Keyword intent detection
//! ```

pub mod announcement;
pub mod auth;
pub mod bundle;
pub mod generate;
pub mod health;
pub mod intent;
pub mod products;
pub mod shops;

use axum::Router;
use secrecy::ExposeSecret;
use serde::Deserialize;

use launchkit_core::ShopDomain;

use crate::db::{RunKind, RunRepository, ShopRepository};
use crate::error::AppError;
use crate::state::AppState;

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(shops::router())
        .merge(products::router())
        .merge(generate::router())
        .merge(bundle::router())
        .merge(announcement::router())
        .merge(intent::router())
}

/// `?shop=` query parameter.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub shop: String,
}

/// An installed shop with its token, ready for Admin API calls.
pub(crate) struct ConnectedShop {
    pub shop: ShopDomain,
    token: secrecy::SecretString,
}

impl ConnectedShop {
    /// Look up `shop` and fail with `NotConnected` if it never installed.
    pub async fn load(state: &AppState, shop: &str) -> Result<Self, AppError> {
        let shop = ShopDomain::parse(shop)?;
        let record = ShopRepository::new(state.pool())
            .get(&shop)
            .await?
            .ok_or_else(|| AppError::NotConnected(shop.clone()))?;

        Ok(Self {
            shop,
            token: record.access_token,
        })
    }

    /// Admin API access token.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Record a change written to a shop.
///
/// The change already happened, so a failed insert is logged rather than
/// turned into an error response.
pub(crate) async fn record_run(
    state: &AppState,
    shop: &ShopDomain,
    product_id: Option<u64>,
    kind: RunKind,
) {
    if let Err(e) = RunRepository::new(state.pool())
        .record(shop, product_id, kind)
        .await
    {
        let event_id = sentry::capture_error(&e);
        tracing::error!(error = %e, shop = %shop, kind = kind.as_str(), sentry_event_id = %event_id, "Failed to record run");
    }
}
