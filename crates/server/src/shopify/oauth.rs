//! App install flow: authorize URL, callback signature, token exchange.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::instrument;

use launchkit_core::ShopDomain;

use super::{ShopifyClient, ShopifyError};

type HmacSha256 = Hmac<Sha256>;

/// Query parameters Shopify appends to the OAuth callback.
///
/// Kept as an ordered map: the signature covers every parameter Shopify
/// sent, including ones this app never reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct OAuthCallbackParams(BTreeMap<String, String>);

impl OAuthCallbackParams {
    /// Look up a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Authorization code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    /// Shop domain as sent by Shopify (unvalidated).
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.get("shop")
    }

    /// CSRF nonce issued at install.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// Signed message: every parameter except `hmac` and `signature`,
    /// sorted by key, as `k=v` pairs joined with `&`.
    fn signed_message(&self) -> String {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != "hmac" && k.as_str() != "signature")
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl FromIterator<(String, String)> for OAuthCallbackParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Offline access token returned by the token exchange.
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub scope: String,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

impl ShopifyClient {
    /// URL that starts the install flow for `shop`.
    #[must_use]
    pub fn authorization_url(&self, shop: &ShopDomain, redirect_uri: &str, state: &str) -> String {
        let scope = self.inner.scopes.join(",");
        format!(
            "{}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}&state={}",
            self.shop_url(shop),
            urlencoding::encode(&self.inner.api_key),
            urlencoding::encode(&scope),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Check the HMAC-SHA256 signature on an OAuth callback.
    ///
    /// Comparison is constant-time. A missing or non-hex `hmac` fails.
    #[must_use]
    pub fn verify_hmac(&self, params: &OAuthCallbackParams) -> bool {
        let Some(provided) = params.get("hmac") else {
            return false;
        };
        let Ok(provided) = hex::decode(provided) else {
            return false;
        };
        let Ok(mut mac) =
            HmacSha256::new_from_slice(self.inner.api_secret.expose_secret().as_bytes())
        else {
            return false;
        };
        mac.update(params.signed_message().as_bytes());
        mac.verify_slice(&provided).is_ok()
    }

    /// Exchange an authorization code for an offline access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Status` if Shopify rejects the code, or
    /// `ShopifyError::Transport` if the request fails.
    #[instrument(skip(self, code), fields(shop = %shop))]
    pub async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessToken, ShopifyError> {
        let url = format!("{}/admin/oauth/access_token", self.shop_url(shop));
        let body = json!({
            "client_id": self.inner.api_key,
            "client_secret": self.inner.api_secret.expose_secret(),
            "code": code,
        });

        Self::send(self.inner.client.post(&url).json(&body)).await
    }
}
