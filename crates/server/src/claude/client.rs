//! Claude API client for one-shot completions.
//!
//! Each call is a single POST to the Messages API. The request timeout is
//! enforced by reqwest; a timed-out future is dropped, which cancels the
//! in-flight request.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use launchkit_core::RawModelReply;
use launchkit_core::ingest::prompt::PING_TEMPLATE;

use crate::config::ClaudeConfig;

use super::error::{ApiErrorResponse, ClaudeError, excerpt};
use super::types::{Message, MessagesRequest, MessagesResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

impl ClaudeClient {
    /// Create a new Claude client.
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError::Config` if the API key is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(config: &ClaudeConfig) -> Result<Self, ClaudeError> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| ClaudeError::Config("API key contains invalid header characters".to_string()))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClaudeError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                api_url: config.api_url.clone(),
                model: config.model.clone(),
            }),
        })
    }

    /// Model ID sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Send a single user prompt and return the raw reply.
    ///
    /// # Errors
    ///
    /// Returns a `ClaudeError` if the request times out, cannot be sent, or
    /// the API answers with a non-success status or an unreadable body.
    #[instrument(
        skip(self, prompt),
        fields(model = %self.inner.model, prompt_chars = prompt.len(), stop_reason = tracing::field::Empty)
    )]
    pub async fn complete(
        &self,
        prompt: String,
        max_tokens: u32,
    ) -> Result<RawModelReply, ClaudeError> {
        let request = MessagesRequest {
            model: self.inner.model.clone(),
            max_tokens,
            messages: vec![Message::user(prompt)],
        };

        let response = self
            .inner
            .client
            .post(&self.inner.api_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_status(status, response).await);
        }

        let body = response.text().await?;
        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| ClaudeError::Decode(format!("{e}; body: {}", excerpt(&body))))?;

        let reply = RawModelReply::from(parsed);
        tracing::Span::current().record("stop_reason", tracing::field::debug(reply.stop_reason));
        if let Some(usage) = reply.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Claude usage"
            );
        }
        Ok(reply)
    }

    /// Connectivity check with a tiny fixed prompt.
    ///
    /// # Errors
    ///
    /// Same as [`Self::complete`].
    pub async fn ping(&self) -> Result<RawModelReply, ClaudeError> {
        self.complete(PING_TEMPLATE.text.to_string(), PING_TEMPLATE.max_tokens)
            .await
    }

    /// Classify a non-success response.
    async fn error_from_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ClaudeError {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => return ClaudeError::Unauthorized,
            reqwest::StatusCode::NOT_FOUND => return ClaudeError::EndpointNotFound,
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse().ok());
                return ClaudeError::RateLimited { retry_after };
            }
            _ => {}
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return e.into(),
        };

        match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_error) => ClaudeError::Api {
                status: status.as_u16(),
                error_type: api_error.error.error_type,
                message: api_error.error.message,
            },
            Err(_) => ClaudeError::HttpStatus {
                status: status.as_u16(),
                body_excerpt: excerpt(&body),
            },
        }
    }
}
