//! Launchkit server library.
//!
//! The HTTP backend for the launch assistant, exposed as a library so the
//! router can be exercised in tests without binding a socket.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`claude`] - Messages API client
//! - [`shopify`] - Admin REST client and OAuth
//! - [`db`] - `PostgreSQL` repositories and migrations
//! - [`routes`] - HTTP handlers
//! - [`error`] - Error to response mapping

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod claude;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod shopify;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use state::AppState;

/// Build the application with all middleware attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::claude::ClaudeClient;
    use crate::config::{ClaudeConfig, LogFormat, ServerConfig, ShopifyAppConfig};
    use crate::shopify::ShopifyClient;

    use super::*;

    /// State whose pool never connects; only routes that fail before
    /// touching the database can be exercised with it.
    fn test_state(claude_url: &str) -> AppState {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost:1/unused"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            app_url: "https://api.launchkit.test".to_string(),
            frontend_url: "https://app.launchkit.test".to_string(),
            shopify: ShopifyAppConfig {
                api_key: "test_api_key".to_string(),
                api_secret: SecretString::from("shpss_super_secret_value"),
                api_version: "2024-10".to_string(),
                scopes: vec!["read_products".to_string()],
            },
            claude: ClaudeConfig {
                api_key: SecretString::from("sk-ant-test"),
                model: "claude-test".to_string(),
                api_url: claude_url.to_string(),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
            log_format: LogFormat::Text,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/unused")
            .expect("lazy pool");
        let claude = ClaudeClient::new(&config.claude).expect("claude client");
        let shopify = ShopifyClient::new(&config.shopify).expect("shopify client");
        AppState::new(config, pool, claude, shopify)
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app(state).oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn json_body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(test_state("http://unused"), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_agent_intent() {
        let (status, body) = send(
            test_state("http://unused"),
            post_json("/api/agent-intent", &json!({"prompt": "Bundle two mugs"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["action"], "bundle");
        assert_eq!(body["show_section"], "bundle");
    }

    #[tokio::test]
    async fn test_invalid_shop_rejected_before_lookup() {
        let (status, body) = send(
            test_state("http://unused"),
            get("/api/shops/me?shop=evil.example.com"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_apply_revalidates_posted_suggestion() {
        let request = post_json(
            "/api/apply",
            &json!({
                "shop": "demo-store.myshopify.com",
                "product_id": 1,
                "suggestion": {"title": "Mug"}
            }),
        );
        let (status, body) = send(test_state("http://unused"), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = json_body(&body);
        assert_eq!(body["error"], "invalid_payload");
        assert!(
            body["message"]
                .as_str()
                .expect("message")
                .contains("description_html")
        );
    }

    #[tokio::test]
    async fn test_create_bundle_rejects_out_of_range_discount() {
        let request = post_json(
            "/api/create-bundle",
            &json!({
                "shop": "demo-store.myshopify.com",
                "product_a": {"id": 1, "variants": [{"price": "10.00"}]},
                "product_b": {"id": 2, "variants": [{"price": "12.00"}]},
                "bundle": {
                    "title": "Set",
                    "description_html": "<p>x</p>",
                    "tags": "a",
                    "bundle_price_percent_off": 100,
                    "bundle_notes": ""
                }
            }),
        );
        let (status, body) = send(test_state("http://unused"), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"], "invalid_payload");
    }

    #[tokio::test]
    async fn test_generate_bundle_requires_two_products() {
        let request = post_json(
            "/api/generate-bundle",
            &json!({"shop": "demo-store.myshopify.com", "product_a_id": 7, "product_b_id": 7}),
        );
        let (status, _) = send(test_state("http://unused"), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_apply_announcement_rejects_non_snippet_filename() {
        let request = post_json(
            "/api/apply-announcement",
            &json!({
                "shop": "demo-store.myshopify.com",
                "announcement": {
                    "filename": "layout/theme.liquid",
                    "content": "{{ content_for_layout }}",
                    "preview_html": "<div></div>"
                }
            }),
        );
        let (status, body) = send(test_state("http://unused"), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            json_body(&body)["message"]
                .as_str()
                .expect("message")
                .contains("layout/theme.liquid")
        );
    }

    #[tokio::test]
    async fn test_callback_with_bad_hmac_is_forbidden() {
        let (status, body) = send(
            test_state("http://unused"),
            get("/auth/callback?code=abc&shop=demo-store.myshopify.com&state=s&hmac=deadbeef"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json_body(&body)["error"], "oauth_rejected");
    }

    #[tokio::test]
    async fn test_test_claude_reports_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "claude-test",
                "stop_reason": "end_turn",
                "content": [{"type": "text", "text": "Hello, Claude API is working!"}],
                "usage": {"input_tokens": 10, "output_tokens": 8}
            })))
            .mount(&server)
            .await;

        let (status, body) = send(
            test_state(&format!("{}/v1/messages", server.uri())),
            get("/api/test-claude"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["success"], true);
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["usage"]["output_tokens"], 8);
    }

    #[tokio::test]
    async fn test_test_claude_reports_failure_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (status, body) = send(
            test_state(&format!("{}/v1/messages", server.uri())),
            get("/api/test-claude"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid Claude API key");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/agent-intent")
            .header("origin", "https://app.launchkit.test")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .expect("request");
        let response = app(test_state("http://unused"))
            .oneshot(request)
            .await
            .expect("response");
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }
}
