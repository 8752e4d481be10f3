//! Unified error handling for the HTTP surface.
//!
//! Every error renders as `{"error": <code>, "message": <text>}` plus any
//! extra fields the frontend needs to act on it.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;

use launchkit_core::{FailureCategory, PipelineError, ShopDomain, ShopDomainError};

use crate::claude::ClaudeError;
use crate::db::RepositoryError;
use crate::shopify::ShopifyError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shopify API operation failed.
    #[error("Shopify error: {source}")]
    Shopify {
        /// Shop the request was for, when known.
        shop: Option<ShopDomain>,
        #[source]
        source: ShopifyError,
    },

    /// Claude API call failed.
    #[error("Claude error: {0}")]
    Claude(#[from] ClaudeError),

    /// The model replied but the reply is unusable.
    #[error("AI reply rejected: {0}")]
    Pipeline(#[from] PipelineError),

    /// A document posted by the client failed validation.
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[source] PipelineError),

    /// Shop has not installed the app.
    #[error("Shop not connected: {0}")]
    NotConnected(ShopDomain),

    /// OAuth callback failed verification.
    #[error("OAuth rejected: {0}")]
    OAuth(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a Shopify failure with the shop it concerned.
    #[must_use]
    pub fn shopify(shop: &ShopDomain, source: ShopifyError) -> Self {
        Self::Shopify {
            shop: Some(shop.clone()),
            source,
        }
    }

    /// HTTP status, stable error code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
            Self::Claude(e) => claude_parts(e),
            Self::Pipeline(e) => match e.category() {
                FailureCategory::Incomplete => (
                    StatusCode::BAD_GATEWAY,
                    "ai_incomplete",
                    "The AI response was cut off before it finished. Please try again."
                        .to_string(),
                ),
                FailureCategory::Unintelligible | FailureCategory::Transient => (
                    StatusCode::BAD_GATEWAY,
                    "ai_unintelligible",
                    format!("The AI returned a response that could not be used: {e}"),
                ),
            },
            Self::InvalidPayload(e) => (StatusCode::BAD_REQUEST, "invalid_payload", e.to_string()),
            Self::Shopify { source, .. } => shopify_parts(source),
            Self::NotConnected(_) => (
                StatusCode::UNAUTHORIZED,
                "not_connected",
                "Shop is not connected. Please install the app first.".to_string(),
            ),
            Self::OAuth(reason) => (StatusCode::FORBIDDEN, "oauth_rejected", reason.clone()),
            Self::BadRequest(reason) => (StatusCode::BAD_REQUEST, "bad_request", reason.clone()),
        }
    }

    fn report(&self) {
        match self {
            Self::Database(_) | Self::Internal(_) => {
                let event_id = sentry::capture_error(self);
                tracing::error!(error = %self, sentry_event_id = %event_id, "Request error");
            }
            Self::Claude(
                ClaudeError::Unauthorized | ClaudeError::EndpointNotFound | ClaudeError::Config(_),
            ) => {
                let event_id = sentry::capture_error(self);
                tracing::error!(error = %self, sentry_event_id = %event_id, "Claude misconfigured");
            }
            Self::Pipeline(PipelineError::MalformedJson {
                offset, context, ..
            }) => {
                tracing::warn!(error = %self, offset = ?offset, context = %context, "AI reply rejected");
            }
            Self::Pipeline(e) => {
                tracing::warn!(error = %self, field = ?e.field(), category = ?e.category(), "AI reply rejected");
            }
            Self::Claude(_) | Self::Shopify { .. } => {
                tracing::warn!(error = %self, "Upstream request failed");
            }
            _ => {}
        }
    }
}

impl From<ShopifyError> for AppError {
    fn from(source: ShopifyError) -> Self {
        Self::Shopify { shop: None, source }
    }
}

impl From<ShopDomainError> for AppError {
    fn from(err: ShopDomainError) -> Self {
        Self::BadRequest(format!("invalid shop: {err}"))
    }
}

fn claude_parts(err: &ClaudeError) -> (StatusCode, &'static str, String) {
    match err {
        ClaudeError::Timeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "ai_timeout",
            "The AI service took too long to respond. Please try again.".to_string(),
        ),
        ClaudeError::RateLimited { .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            "ai_rate_limited",
            "The AI service is busy. Please wait a moment and try again.".to_string(),
        ),
        _ => (
            StatusCode::BAD_GATEWAY,
            "ai_unreachable",
            "The AI service is unreachable.".to_string(),
        ),
    }
}

fn shopify_parts(err: &ShopifyError) -> (StatusCode, &'static str, String) {
    match err {
        ShopifyError::ScopeApprovalRequired => (
            StatusCode::FORBIDDEN,
            "scope_approval_required",
            "This app needs approval to access protected customer data.".to_string(),
        ),
        ShopifyError::Transport(e) if e.is_timeout() => (
            StatusCode::GATEWAY_TIMEOUT,
            "shopify_timeout",
            "Request to Shopify timed out. The change may still have been applied; \
             please check your Shopify admin."
                .to_string(),
        ),
        ShopifyError::Transport(_) | ShopifyError::Decode(_) | ShopifyError::UnexpectedResponse(_) => (
            StatusCode::BAD_GATEWAY,
            "shopify_unreachable",
            err.to_string(),
        ),
        ShopifyError::Status { status, body } => (
            StatusCode::BAD_REQUEST,
            "shopify_error",
            format!("Shopify request failed (status {status}): {body}"),
        ),
        ShopifyError::InvalidShop(_) | ShopifyError::InvalidAssetKey(_) => {
            (StatusCode::BAD_REQUEST, "bad_request", err.to_string())
        }
    }
}

/// Steps shown when the merchant has to approve protected data access.
fn approval_instructions(shop: Option<&ShopDomain>) -> Vec<String> {
    let settings = shop.map_or_else(
        || "your Shopify admin app settings".to_string(),
        |s| format!("https://{s}/admin/settings/apps"),
    );
    vec![
        format!("Go to {settings}"),
        "Find this app in your installed apps".to_string(),
        "Click on the app and look for 'Protected customer data access'".to_string(),
        "Approve the requested data access".to_string(),
        "Reinstall or reconnect the app, then try again".to_string(),
    ]
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();

        let (status, code, message) = self.parts();
        let mut body = Map::new();
        body.insert("error".to_string(), Value::from(code));
        body.insert("message".to_string(), Value::from(message));

        let mut retry_after = None;
        match &self {
            Self::Shopify {
                shop,
                source: ShopifyError::ScopeApprovalRequired,
            } => {
                body.insert(
                    "instructions".to_string(),
                    json!(approval_instructions(shop.as_ref())),
                );
            }
            Self::Claude(ClaudeError::RateLimited {
                retry_after: Some(secs),
            }) => {
                body.insert("retry_after".to_string(), json!(secs));
                retry_after = Some(*secs);
            }
            _ => {}
        }

        let mut response = (status, Json(Value::Object(body))).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
