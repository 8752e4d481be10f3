//! Model connectivity check.
//!
//! # Environment Variables
//!
//! - `CLAUDE_API_KEY` - required
//! - `CLAUDE_MODEL`, `CLAUDE_API_URL`, `CLAUDE_TIMEOUT_SECS` - optional

use launchkit_server::claude::{ClaudeClient, ClaudeError};
use launchkit_server::config::{ClaudeConfig, ConfigError};
use thiserror::Error;

/// Errors that can occur during the ping.
#[derive(Debug, Error)]
pub enum PingError {
    /// Claude settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request failed.
    #[error("{0}")]
    Claude(#[from] ClaudeError),
}

/// Send the ping prompt and log the reply.
///
/// # Errors
///
/// Returns `PingError` if configuration is invalid or the call fails.
pub async fn run() -> Result<(), PingError> {
    let config = ClaudeConfig::from_env()?;
    let client = ClaudeClient::new(&config)?;

    tracing::info!(model = client.model(), url = %config.api_url, "Pinging Claude...");
    let reply = client.ping().await?;

    tracing::info!(
        model = %reply.model_id,
        stop_reason = ?reply.stop_reason,
        input_tokens = reply.usage.map(|u| u.input_tokens),
        output_tokens = reply.usage.map(|u| u.output_tokens),
        "Claude replied: {}",
        reply.text
    );
    Ok(())
}
