//! Raw model output as handed over by the model client.

use serde::{Deserialize, Serialize};

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of the answer (or a stop sequence).
    Complete,
    /// The output token limit was reached mid-answer.
    LengthTruncated,
    /// Anything else the API may report.
    Other,
}

/// Token usage telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: u32,
    /// Generated tokens.
    pub output_tokens: u32,
}

/// A reply from the generative-text endpoint, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModelReply {
    /// Text of the first content block (empty when there was none).
    pub text: String,
    /// Why generation ended.
    pub stop_reason: StopReason,
    /// Model that produced the reply.
    pub model_id: String,
    /// Token usage, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl RawModelReply {
    /// Create a reply without usage telemetry.
    #[must_use]
    pub fn new(text: impl Into<String>, stop_reason: StopReason, model_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stop_reason,
            model_id: model_id.into(),
            usage: None,
        }
    }

    /// Attach usage telemetry.
    #[must_use]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}
