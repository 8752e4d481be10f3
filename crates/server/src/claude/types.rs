//! Types for the Claude Messages API.

use serde::{Deserialize, Serialize};

use launchkit_core::{RawModelReply, StopReason, Usage};

/// A message in a conversation with Claude.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// The role of the message sender ("user" or "assistant").
    pub role: &'static str,
    /// Plain text content.
    pub content: String,
}

impl Message {
    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Request body for the Claude Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Conversation messages.
    pub messages: Vec<Message>,
}

/// Response from the Claude Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    /// Model that generated the response.
    pub model: String,
    /// Reason the response stopped.
    #[serde(default)]
    pub stop_reason: Option<ApiStopReason>,
    /// Response content blocks.
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    /// Token usage information.
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

/// A content block within a response.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Text content.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
    /// Any block type this client does not use.
    #[serde(other)]
    Other,
}

/// Reason the model stopped generating, as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStopReason {
    /// Natural end of response.
    EndTurn,
    /// Max tokens reached.
    MaxTokens,
    /// Stop sequence encountered.
    StopSequence,
    /// Tool use requested.
    ToolUse,
    /// Any reason added after this client was written.
    #[serde(other)]
    Unknown,
}

impl From<ApiStopReason> for StopReason {
    fn from(reason: ApiStopReason) -> Self {
        match reason {
            ApiStopReason::EndTurn | ApiStopReason::StopSequence => Self::Complete,
            ApiStopReason::MaxTokens => Self::LengthTruncated,
            ApiStopReason::ToolUse | ApiStopReason::Unknown => Self::Other,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApiUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl From<MessagesResponse> for RawModelReply {
    fn from(response: MessagesResponse) -> Self {
        let text = response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .unwrap_or_default();
        let stop_reason = response.stop_reason.map_or(StopReason::Other, StopReason::from);

        let reply = Self::new(text, stop_reason, response.model);
        match response.usage {
            Some(u) => reply.with_usage(Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
            None => reply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = MessagesRequest {
            model: "claude-test".to_string(),
            max_tokens: 800,
            messages: vec![Message::user("hi")],
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-test",
                "max_tokens": 800,
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopReason::from(ApiStopReason::EndTurn), StopReason::Complete);
        assert_eq!(StopReason::from(ApiStopReason::StopSequence), StopReason::Complete);
        assert_eq!(
            StopReason::from(ApiStopReason::MaxTokens),
            StopReason::LengthTruncated
        );
        assert_eq!(StopReason::from(ApiStopReason::ToolUse), StopReason::Other);
    }

    #[test]
    fn test_unknown_stop_reason_deserializes() {
        let reason: ApiStopReason = serde_json::from_str("\"refusal\"").expect("deserialize");
        assert_eq!(reason, ApiStopReason::Unknown);
    }

    #[test]
    fn test_reply_takes_first_text_block() {
        let json = r#"{
            "id": "msg_1",
            "model": "claude-test",
            "stop_reason": "end_turn",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let response: MessagesResponse = serde_json::from_str(json).expect("deserialize");
        let reply = RawModelReply::from(response);
        assert_eq!(reply.text, "first");
        assert_eq!(reply.stop_reason, StopReason::Complete);
        assert_eq!(reply.model_id, "claude-test");
        assert_eq!(
            reply.usage,
            Some(Usage {
                input_tokens: 10,
                output_tokens: 5
            })
        );
    }

    #[test]
    fn test_reply_without_content_is_empty() {
        let json = r#"{"model": "claude-test", "stop_reason": "max_tokens", "content": []}"#;
        let response: MessagesResponse = serde_json::from_str(json).expect("deserialize");
        let reply = RawModelReply::from(response);
        assert!(reply.text.is_empty());
        assert_eq!(reply.stop_reason, StopReason::LengthTruncated);
        assert_eq!(reply.usage, None);
    }
}
