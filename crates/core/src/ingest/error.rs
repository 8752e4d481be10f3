//! Failure taxonomy for model reply ingestion.
//!
//! These errors describe a reply that *arrived* and was found unusable.
//! Transport failures (timeouts, HTTP status codes) belong to the model
//! client and never appear here.

use thiserror::Error;

/// How a failure should be presented at the user-facing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// The answer was cut off by the output length limit.
    Incomplete,
    /// An answer arrived but could not be understood.
    Unintelligible,
    /// The model produced no content at all; safe to retry.
    Transient,
}

/// Errors produced while turning a model reply into a validated record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Generation stopped at the output token limit.
    #[error("model reply was truncated by the output length limit")]
    TruncatedResponse,

    /// The reply had no content blocks or only whitespace.
    #[error("model reply contained no text")]
    EmptyResponse,

    /// The extracted text is not valid JSON.
    #[error("model reply is not valid JSON{}: {message}", at_offset(.offset))]
    MalformedJson {
        /// Byte offset of the syntax error within the extracted text.
        offset: Option<usize>,
        /// Text surrounding the offset, or the head of the text when no
        /// offset is known.
        context: String,
        /// Parser message.
        message: String,
    },

    /// The document parsed but its root is not an object.
    #[error("model reply is a JSON {actual}, expected an object")]
    NotAnObject {
        /// JSON type found at the root.
        actual: &'static str,
    },

    /// A required field is absent (or `null`).
    #[error("missing required field `{0}`")]
    MissingField(String),

    /// A field is present but violates its declared constraint.
    #[error("invalid value for `{field}`: expected {constraint}, got {actual}")]
    InvalidFieldValue {
        /// Field name.
        field: String,
        /// Human-readable constraint, e.g. `length==5`.
        constraint: String,
        /// What was found instead.
        actual: String,
    },
}

#[allow(clippy::ref_option)]
fn at_offset(offset: &Option<usize>) -> String {
    offset.map_or_else(String::new, |o| format!(" at byte {o}"))
}

impl PipelineError {
    pub(crate) fn invalid(
        field: &str,
        constraint: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            field: field.to_owned(),
            constraint: constraint.into(),
            actual: actual.into(),
        }
    }

    /// Returns the boundary category for this failure.
    #[must_use]
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::TruncatedResponse => FailureCategory::Incomplete,
            Self::EmptyResponse => FailureCategory::Transient,
            Self::MalformedJson { .. }
            | Self::NotAnObject { .. }
            | Self::MissingField(_)
            | Self::InvalidFieldValue { .. } => FailureCategory::Unintelligible,
        }
    }

    /// Returns the offending field name for schema violations.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField(field) | Self::InvalidFieldValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_json_display_with_offset() {
        let err = PipelineError::MalformedJson {
            offset: Some(15),
            context: "{\"title\": \"x\", }".to_string(),
            message: "trailing comma at line 1 column 16".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "model reply is not valid JSON at byte 15: trailing comma at line 1 column 16"
        );
    }

    #[test]
    fn test_malformed_json_display_without_offset() {
        let err = PipelineError::MalformedJson {
            offset: None,
            context: String::new(),
            message: "io error".to_string(),
        };
        assert_eq!(err.to_string(), "model reply is not valid JSON: io error");
    }

    #[test]
    fn test_invalid_field_value_display() {
        let err = PipelineError::invalid("bullets", "length==5", "4");
        assert_eq!(
            err.to_string(),
            "invalid value for `bullets`: expected length==5, got 4"
        );
        assert_eq!(err.field(), Some("bullets"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            PipelineError::TruncatedResponse.category(),
            FailureCategory::Incomplete
        );
        assert_eq!(
            PipelineError::EmptyResponse.category(),
            FailureCategory::Transient
        );
        assert_eq!(
            PipelineError::MissingField("title".to_string()).category(),
            FailureCategory::Unintelligible
        );
        assert_eq!(
            PipelineError::NotAnObject { actual: "array" }.category(),
            FailureCategory::Unintelligible
        );
    }
}
