//! Integration tests for Launchkit.
//!
//! # Running Tests
//!
//! ```bash
//! # Mocked upstreams only
//! cargo test -p launchkit-integration-tests
//!
//! # Including database tests
//! TEST_DATABASE_URL=postgres://localhost/launchkit_test \
//!     cargo test -p launchkit-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `pipeline` - Claude client plus ingestion against a mocked Messages API
//! - `shopify` - Admin REST flows against a mocked shop
//! - `database` - Repositories against a real `PostgreSQL`

use std::time::Duration;

use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use launchkit_server::claude::ClaudeClient;
use launchkit_server::config::{ClaudeConfig, ShopifyAppConfig};
use launchkit_server::shopify::ShopifyClient;

/// Path the mocked Messages API listens on.
pub const MESSAGES_PATH: &str = "/v1/messages";
/// Shop used throughout the tests.
pub const SHOP: &str = "demo-store.myshopify.com";
/// Access token used throughout the tests.
pub const TOKEN: &str = "shpat_integration";

/// Claude client pointed at `server`.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn claude_client(server: &MockServer) -> ClaudeClient {
    let config = ClaudeConfig {
        api_key: SecretString::from("sk-ant-integration"),
        model: "claude-test".to_string(),
        api_url: format!("{}{MESSAGES_PATH}", server.uri()),
        timeout: Duration::from_secs(5),
    };
    ClaudeClient::new(&config).expect("claude client")
}

/// Shopify client that sends every shop's requests to `server`.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn shopify_client(server: &MockServer) -> ShopifyClient {
    let config = ShopifyAppConfig {
        api_key: "integration-key".to_string(),
        api_secret: SecretString::from("integration-secret"),
        api_version: "2024-10".to_string(),
        scopes: vec!["read_products".to_string(), "write_products".to_string()],
    };
    ShopifyClient::with_base_url(&config, server.uri()).expect("shopify client")
}

/// Messages API response body with a single text block.
#[must_use]
pub fn messages_body(text: &str, stop_reason: &str) -> Value {
    json!({
        "id": "msg_integration",
        "type": "message",
        "role": "assistant",
        "model": "claude-test",
        "stop_reason": stop_reason,
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 900, "output_tokens": 350}
    })
}

/// Mount a Messages API mock that answers every call with `body`.
pub async fn mock_messages(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// A Shopify product as `products/{id}.json` returns it.
#[must_use]
pub fn product(id: u64, title: &str, price: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "body_html": format!("<p>{title}</p>"),
        "tags": "",
        "variants": [{"id": id * 10, "price": price}],
        "images": [{"src": format!("https://cdn.shopify.com/{id}.jpg")}]
    })
}

/// A valid product suggestion document.
#[must_use]
pub fn suggestion_doc() -> Value {
    json!({
        "title": "Hand-thrown Ceramic Mug",
        "description_html": "<p>Stoneware mug.</p>",
        "bullets": ["12oz", "Dishwasher safe", "Handmade", "Lead free", "Gift ready"],
        "tags": ["mug", "ceramic", "handmade"],
        "seo_title": "Hand-thrown Ceramic Mug",
        "seo_description": "A 12oz stoneware mug, thrown by hand.",
        "discount_code": "LAUNCH15",
        "discount_percent": 15,
        "banner_copy": "New mugs: 15% off with LAUNCH15"
    })
}
