//! Shopify app install (OAuth) routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::Redirect,
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use launchkit_core::ShopDomain;

use crate::db::{OAuthStateRepository, ShopRepository};
use crate::error::AppError;
use crate::shopify::OAuthCallbackParams;
use crate::state::AppState;

use super::ShopQuery;

/// Build the OAuth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/install", get(install))
        .route("/auth/callback", get(callback))
}

/// Response for the install endpoint.
#[derive(Debug, Serialize)]
pub struct InstallResponse {
    pub install_url: String,
}

/// GET /auth/install - Issue a nonce and return the Shopify install URL.
#[instrument(skip(state))]
async fn install(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<InstallResponse>, AppError> {
    let shop = ShopDomain::parse(&query.shop)?;
    let states = OAuthStateRepository::new(state.pool());

    match states.purge_expired().await {
        Ok(0) => {}
        Ok(purged) => tracing::debug!(purged, "Purged expired OAuth states"),
        Err(e) => tracing::warn!(error = %e, "Failed to purge expired OAuth states"),
    }

    let nonce = states.issue(&shop).await?;
    let install_url =
        state
            .shopify()
            .authorization_url(&shop, &state.config().oauth_redirect_uri(), &nonce);

    tracing::info!(shop = %shop, "Issued install URL");
    Ok(Json(InstallResponse { install_url }))
}

/// GET /auth/callback - Verify the callback, store the token, redirect to the frontend.
#[instrument(skip(state, params))]
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Redirect, AppError> {
    if !state.shopify().verify_hmac(&params) {
        tracing::warn!("Invalid HMAC signature in OAuth callback");
        return Err(AppError::OAuth("invalid HMAC signature".to_string()));
    }

    if let Some(error) = params.get("error") {
        let description = params.get("error_description").unwrap_or_default();
        tracing::warn!(error, description, "Shopify OAuth error");
        return Err(AppError::OAuth(format!("authorization denied: {error}")));
    }

    let shop = ShopDomain::parse(params.shop().unwrap_or_default())?;
    let code = params
        .code()
        .ok_or_else(|| AppError::BadRequest("missing authorization code".to_string()))?;
    let nonce = params
        .state()
        .ok_or_else(|| AppError::OAuth("missing state parameter".to_string()))?;

    if !OAuthStateRepository::new(state.pool())
        .consume(nonce, &shop)
        .await?
    {
        tracing::warn!(shop = %shop, "Unknown, reused or expired OAuth state");
        return Err(AppError::OAuth("invalid or expired state".to_string()));
    }

    let token = state
        .shopify()
        .exchange_code(&shop, code)
        .await
        .map_err(|e| AppError::shopify(&shop, e))?;

    ShopRepository::new(state.pool())
        .upsert(&shop, &token.access_token, &token.scope)
        .await?;

    tracing::info!(shop = %shop, scope = %token.scope, "Shop connected");
    Ok(Redirect::to(&frontend_redirect(
        &state.config().frontend_url,
        &shop,
    )))
}

/// Post-install landing URL on the frontend.
fn frontend_redirect(frontend_url: &str, shop: &ShopDomain) -> String {
    format!(
        "{frontend_url}?shop={}&connected=true",
        urlencoding::encode(shop.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontend_redirect() {
        let shop = ShopDomain::parse("demo-store.myshopify.com").expect("shop");
        assert_eq!(
            frontend_redirect("https://launch.example", &shop),
            "https://launch.example?shop=demo-store.myshopify.com&connected=true"
        );
    }
}
