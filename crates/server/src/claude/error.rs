//! Error types for the Claude API client.
//!
//! Every variant means the call itself failed. A reply that arrived but
//! cannot be used is a [`launchkit_core::PipelineError`] instead.

use thiserror::Error;

/// Maximum characters of an unparseable error body kept for diagnostics.
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Errors that can occur when interacting with the Claude API.
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// The request did not complete within the configured timeout.
    #[error("request to Claude API timed out")]
    Timeout,

    /// Connection or protocol failure before a response arrived.
    #[error("network error connecting to Claude API: {0}")]
    Transport(#[source] reqwest::Error),

    /// The API key was rejected.
    #[error("invalid Claude API key")]
    Unauthorized,

    /// Rate limited by the API.
    #[error("Claude API rate limit exceeded{}", retry_hint(.retry_after))]
    RateLimited {
        /// Seconds to wait, from the `retry-after` header.
        retry_after: Option<u64>,
    },

    /// The configured endpoint does not exist.
    #[error("Claude API endpoint not found (404)")]
    EndpointNotFound,

    /// The API returned a structured error.
    #[error("Claude API error {status} ({error_type}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error type from the API.
        error_type: String,
        /// Error message.
        message: String,
    },

    /// Non-success status with a body that is not an API error document.
    #[error("Claude API error {status}: {body_excerpt}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// First characters of the body.
        body_excerpt: String,
    },

    /// A success response whose body is not a Messages API response.
    #[error("failed to decode Claude API response: {0}")]
    Decode(String),

    /// The client could not be constructed.
    #[error("invalid Claude client configuration: {0}")]
    Config(String),
}

#[allow(clippy::ref_option)]
fn retry_hint(retry_after: &Option<u64>) -> String {
    retry_after.map_or_else(String::new, |s| format!(", retry after {s} seconds"))
}

impl From<reqwest::Error> for ClaudeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

/// Cut a body to [`BODY_EXCERPT_CHARS`] characters.
pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// API error response from Claude.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Error type.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Nested error details.
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    /// Error type.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message.
    pub message: String,
}
