//! Admin REST calls.

use std::sync::Arc;
use std::time::Duration;

use reqwest::RequestBuilder;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::instrument;

use launchkit_core::ShopDomain;

use crate::config::ShopifyAppConfig;

use super::types::{
    Asset, AssetEnvelope, DiscountCode, DiscountCodeEnvelope, MAIN_THEME_ROLE, NewMetafield,
    NewPriceRule, NewProduct, PriceRule, PriceRuleEnvelope, ProductEnvelope, ProductUpdate, Theme,
    ThemesEnvelope,
};
use super::{ShopifyError, status_error};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
/// Product creation with remote images can be slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Largest page Shopify serves for `products.json`.
pub const MAX_PRODUCT_LIMIT: u32 = 250;

/// Shopify Admin REST client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ShopifyClient {
    pub(super) inner: Arc<ShopifyClientInner>,
}

pub(super) struct ShopifyClientInner {
    pub(super) client: reqwest::Client,
    pub(super) api_key: String,
    pub(super) api_secret: SecretString,
    pub(super) api_version: String,
    pub(super) scopes: Vec<String>,
    /// Replaces `https://{shop}` for every shop when set.
    base_url: Option<String>,
}

impl ShopifyClient {
    /// Create a client for the app described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyAppConfig) -> Result<Self, ShopifyError> {
        Self::build(config, None)
    }

    /// Create a client that sends every shop's requests to `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Transport` if the HTTP client cannot be built.
    pub fn with_base_url(
        config: &ShopifyAppConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ShopifyError> {
        Self::build(config, Some(base_url.into()))
    }

    fn build(config: &ShopifyAppConfig, base_url: Option<String>) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                api_version: config.api_version.clone(),
                scopes: config.scopes.clone(),
                base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            }),
        })
    }

    /// Origin serving `shop`.
    pub(super) fn shop_url(&self, shop: &ShopDomain) -> String {
        self.inner
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{shop}"))
    }

    fn admin_url(&self, shop: &ShopDomain, resource: &str) -> String {
        format!(
            "{}/admin/api/{}/{resource}",
            self.shop_url(shop),
            self.inner.api_version
        )
    }

    /// Send `request` and decode a success body as `T`.
    pub(super) async fn send<T: DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<T, ShopifyError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Shopify request failed");
            return Err(status_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ShopifyError::Decode(e.to_string()))
    }

    fn get(&self, shop: &ShopDomain, token: &str, resource: &str) -> RequestBuilder {
        self.inner
            .client
            .get(self.admin_url(shop, resource))
            .header(ACCESS_TOKEN_HEADER, token)
    }

    fn post(&self, shop: &ShopDomain, token: &str, resource: &str) -> RequestBuilder {
        self.inner
            .client
            .post(self.admin_url(shop, resource))
            .header(ACCESS_TOKEN_HEADER, token)
    }

    fn put(&self, shop: &ShopDomain, token: &str, resource: &str) -> RequestBuilder {
        self.inner
            .client
            .put(self.admin_url(shop, resource))
            .header(ACCESS_TOKEN_HEADER, token)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products. `limit` is clamped to `1..=250`.
    ///
    /// Returns Shopify's body unchanged (`{"products": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::ScopeApprovalRequired` if the merchant has not
    /// approved the app's data access, or another `ShopifyError` on failure.
    #[instrument(skip(self, token), fields(shop = %shop))]
    pub async fn list_products(
        &self,
        shop: &ShopDomain,
        token: &str,
        limit: u32,
    ) -> Result<Value, ShopifyError> {
        let limit = limit.clamp(1, MAX_PRODUCT_LIMIT);
        Self::send(self.get(shop, token, &format!("products.json?limit={limit}"))).await
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns a `ShopifyError` if the request fails or the product does not exist.
    #[instrument(skip(self, token), fields(shop = %shop))]
    pub async fn get_product(
        &self,
        shop: &ShopDomain,
        token: &str,
        product_id: u64,
    ) -> Result<Value, ShopifyError> {
        let envelope: ProductEnvelope =
            Self::send(self.get(shop, token, &format!("products/{product_id}.json"))).await?;
        Ok(envelope.product)
    }

    /// Overwrite title, description and tags of a product.
    ///
    /// # Errors
    ///
    /// Returns a `ShopifyError` if the request fails.
    #[instrument(skip(self, token, update), fields(shop = %shop, product_id = update.id))]
    pub async fn update_product(
        &self,
        shop: &ShopDomain,
        token: &str,
        update: &ProductUpdate<'_>,
    ) -> Result<Value, ShopifyError> {
        let resource = format!("products/{}.json", update.id);
        let envelope: ProductEnvelope =
            Self::send(self.put(shop, token, &resource).json(&json!({ "product": update }))).await?;
        Ok(envelope.product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns a `ShopifyError` if the request fails.
    #[instrument(skip(self, token, product), fields(shop = %shop, title = %product.title))]
    pub async fn create_product(
        &self,
        shop: &ShopDomain,
        token: &str,
        product: &NewProduct,
    ) -> Result<Value, ShopifyError> {
        let envelope: ProductEnvelope = Self::send(
            self.post(shop, token, "products.json")
                .json(&json!({ "product": product })),
        )
        .await?;
        Ok(envelope.product)
    }

    /// Attach a metafield to a resource.
    ///
    /// # Errors
    ///
    /// Returns a `ShopifyError` if the request fails.
    #[instrument(skip(self, token, metafield), fields(shop = %shop, owner_id = metafield.owner_id))]
    pub async fn create_metafield(
        &self,
        shop: &ShopDomain,
        token: &str,
        metafield: &NewMetafield,
    ) -> Result<Value, ShopifyError> {
        Self::send(
            self.post(shop, token, "metafields.json")
                .json(&json!({ "metafield": metafield })),
        )
        .await
    }

    // =========================================================================
    // Discounts
    // =========================================================================

    /// Create a price rule.
    ///
    /// # Errors
    ///
    /// Returns a `ShopifyError` if the request fails.
    #[instrument(skip(self, token, rule), fields(shop = %shop, title = %rule.title))]
    pub async fn create_price_rule(
        &self,
        shop: &ShopDomain,
        token: &str,
        rule: &NewPriceRule,
    ) -> Result<PriceRule, ShopifyError> {
        let envelope: PriceRuleEnvelope = Self::send(
            self.post(shop, token, "price_rules.json")
                .json(&json!({ "price_rule": rule })),
        )
        .await?;
        Ok(envelope.price_rule)
    }

    /// Create a discount code under an existing price rule.
    ///
    /// # Errors
    ///
    /// Returns a `ShopifyError` if the request fails.
    #[instrument(skip(self, token), fields(shop = %shop))]
    pub async fn create_discount_code(
        &self,
        shop: &ShopDomain,
        token: &str,
        price_rule_id: u64,
        code: &str,
    ) -> Result<DiscountCode, ShopifyError> {
        let resource = format!("price_rules/{price_rule_id}/discount_codes.json");
        let envelope: DiscountCodeEnvelope = Self::send(
            self.post(shop, token, &resource)
                .json(&json!({ "discount_code": { "code": code } })),
        )
        .await?;
        Ok(envelope.discount_code)
    }

    // =========================================================================
    // Themes
    // =========================================================================

    /// Find the published theme.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UnexpectedResponse` if no theme has the `main`
    /// role, or another `ShopifyError` if the request fails.
    #[instrument(skip(self, token), fields(shop = %shop))]
    pub async fn main_theme(&self, shop: &ShopDomain, token: &str) -> Result<Theme, ShopifyError> {
        let envelope: ThemesEnvelope = Self::send(self.get(shop, token, "themes.json")).await?;
        envelope
            .themes
            .into_iter()
            .find(|t| t.role == MAIN_THEME_ROLE)
            .ok_or_else(|| ShopifyError::UnexpectedResponse("shop has no main theme".to_string()))
    }

    /// Write a Liquid snippet into a theme.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::InvalidAssetKey` if `key` is not a
    /// `snippets/*.liquid` path, or another `ShopifyError` if the request fails.
    #[instrument(skip(self, token, value), fields(shop = %shop))]
    pub async fn put_asset(
        &self,
        shop: &ShopDomain,
        token: &str,
        theme_id: u64,
        key: &str,
        value: &str,
    ) -> Result<Asset, ShopifyError> {
        let key = snippet_key(key)?;
        let resource = format!("themes/{theme_id}/assets.json");
        let envelope: AssetEnvelope = Self::send(
            self.put(shop, token, &resource)
                .json(&json!({ "asset": { "key": key, "value": value } })),
        )
        .await?;
        Ok(envelope.asset)
    }
}

const SNIPPET_DIR: &str = "snippets/";
const LIQUID_EXT: &str = ".liquid";

/// Canonical theme key for a snippet filename.
///
/// Accepts `name.liquid` or `snippets/name.liquid` where `name` is made of
/// ASCII letters, digits, `-` and `_`.
///
/// # Errors
///
/// Returns `ShopifyError::InvalidAssetKey` for anything else.
pub fn snippet_key(filename: &str) -> Result<String, ShopifyError> {
    let invalid = || ShopifyError::InvalidAssetKey(filename.to_string());
    let trimmed = filename.trim();
    let file = trimmed.strip_prefix(SNIPPET_DIR).unwrap_or(trimmed);
    let name = file.strip_suffix(LIQUID_EXT).ok_or_else(invalid)?;

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(invalid());
    }
    Ok(format!("{SNIPPET_DIR}{name}{LIQUID_EXT}"))
}
