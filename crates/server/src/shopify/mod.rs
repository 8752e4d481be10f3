//! Shopify Admin REST client for installed shops.
//!
//! Every call is scoped to one shop and carries that shop's offline access
//! token. Tokens live in the database, never in the client.
//!
//! # Example
//!
//! ```rust,ignore
//! use launchkit_server::shopify::ShopifyClient;
//!
//! let client = ShopifyClient::new(&config.shopify)?;
//! let products = client.list_products(&shop, &token, 50).await?;
//! ```

mod client;
mod oauth;
pub mod types;

pub use client::{MAX_PRODUCT_LIMIT, ShopifyClient, snippet_key};
pub use oauth::{AccessToken, OAuthCallbackParams};
pub use types::*;

use launchkit_core::ShopDomainError;
use thiserror::Error;

/// Maximum characters of an upstream error body kept in [`ShopifyError::Status`].
pub const BODY_EXCERPT_CHARS: usize = 500;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("Shopify returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The app's protected-data scopes have not been approved by the merchant.
    #[error("app requires merchant approval for protected customer data")]
    ScopeApprovalRequired,

    /// Response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Decode(String),

    /// Shop domain failed validation.
    #[error("invalid shop: {0}")]
    InvalidShop(#[from] ShopDomainError),

    /// Theme asset key outside `snippets/*.liquid`.
    #[error("invalid asset key: {0}")]
    InvalidAssetKey(String),

    /// Response was well-formed but missing something we need.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ShopifyError {
    /// Whether the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Shopify's wording for an unapproved protected-data scope.
const APPROVAL_MARKER: &str = "merchant approval";

/// Classify a non-success response body.
fn status_error(status: u16, body: &str) -> ShopifyError {
    if status == 403 && body.to_lowercase().contains(APPROVAL_MARKER) {
        return ShopifyError::ScopeApprovalRequired;
    }
    ShopifyError::Status {
        status,
        body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_marker_detected_case_insensitively() {
        let err = status_error(
            403,
            r#"{"errors":"This app is not approved to access REST endpoints with protected customer data. Merchant Approval required"}"#,
        );
        assert!(matches!(err, ShopifyError::ScopeApprovalRequired));
    }

    #[test]
    fn test_plain_forbidden_is_status() {
        let err = status_error(403, "Forbidden");
        assert!(matches!(err, ShopifyError::Status { status: 403, .. }));
    }

    #[test]
    fn test_status_body_is_excerpted() {
        let err = status_error(500, &"e".repeat(2000));
        match err {
            ShopifyError::Status { body, .. } => assert_eq!(body.len(), BODY_EXCERPT_CHARS),
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::UnexpectedResponse("no main theme".to_string());
        assert_eq!(err.to_string(), "unexpected response: no main theme");
    }
}
