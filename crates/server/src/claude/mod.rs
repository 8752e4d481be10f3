//! Claude API integration.
//!
//! The client returns [`launchkit_core::RawModelReply`] and nothing more;
//! interpreting the text is the ingestion pipeline's job.

mod client;
mod error;
pub mod types;

pub use client::ClaudeClient;
pub use error::{ApiError, ApiErrorResponse, BODY_EXCERPT_CHARS, ClaudeError};
