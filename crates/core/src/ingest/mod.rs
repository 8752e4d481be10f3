//! Model reply ingestion.
//!
//! One forward path per reply:
//!
//! ```text
//! RawModelReply -> extract -> decode(schema) -> normalize -> T: Validated
//! ```
//!
//! The three record types share every stage and differ only in the
//! [`Schema`] they declare. Nothing here retries or substitutes defaults;
//! every failure comes back as a [`PipelineError`].

pub mod decode;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod prompt;
pub mod records;
pub mod reply;
pub mod schema;

use serde_json::Value;

pub use decode::{DecodedFields, FieldValue, TagsValue, decode, decode_value};
pub use error::{FailureCategory, PipelineError};
pub use extract::{ExtractedText, extract};
pub use normalize::{NormalizedFields, normalize};
pub use prompt::{GenerationRequest, PromptTemplate};
pub use records::{Announcement, BundleProposal, ProductSuggestion, Validated};
pub use reply::{RawModelReply, StopReason, Usage};
pub use schema::{FieldKind, FieldSpec, Schema};

/// Turn a model reply into a validated record.
///
/// A length-truncated reply is rejected before any parsing, even if the
/// partial text happens to be valid JSON.
///
/// # Errors
///
/// Returns the first [`PipelineError`] hit along the path.
pub fn ingest<T: Validated>(reply: &RawModelReply) -> Result<T, PipelineError> {
    if reply.stop_reason == StopReason::LengthTruncated {
        return Err(PipelineError::TruncatedResponse);
    }
    if reply.text.trim().is_empty() {
        return Err(PipelineError::EmptyResponse);
    }

    let text = extract(&reply.text);
    let fields = decode(&text, &T::SCHEMA)?;
    T::from_fields(normalize(fields))
}

/// Validate a document that did not come straight from the model, such as
/// a suggestion posted back by the frontend before it is applied.
///
/// # Errors
///
/// Returns a schema [`PipelineError`] if `value` does not match `T`.
pub fn revalidate<T: Validated>(value: Value) -> Result<T, PipelineError> {
    let fields = decode_value(value, &T::SCHEMA)?;
    T::from_fields(normalize(fields))
}
