//! Offline pipeline run on a saved model reply.
//!
//! Useful for reproducing a rejected reply from logs: save the text, run
//! it through the same extraction, decoding and normalisation the server
//! uses, and see either the record or the exact diagnostic.

use std::path::Path;

use clap::ValueEnum;
use launchkit_core::{
    Announcement, BundleProposal, PipelineError, ProductSuggestion, RawModelReply, StopReason,
    ingest,
};
use serde::Serialize;
use thiserror::Error;

/// Record type to validate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    /// Listing optimisation suggestion.
    Product,
    /// Bundle proposal.
    Bundle,
    /// Announcement snippet.
    Announcement,
}

/// Errors that can occur during validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The reply file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The reply was rejected.
    #[error("Reply rejected ({category:?}): {source}")]
    Rejected {
        category: launchkit_core::FailureCategory,
        #[source]
        source: PipelineError,
    },

    /// The validated record could not be printed.
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<PipelineError> for ValidateError {
    fn from(source: PipelineError) -> Self {
        Self::Rejected {
            category: source.category(),
            source,
        }
    }
}

/// Validate the reply stored in `file` and print the record as JSON.
///
/// # Errors
///
/// Returns `ValidateError` if the file cannot be read or the reply is rejected.
pub fn run(kind: RecordKind, truncated: bool, file: &Path) -> Result<(), ValidateError> {
    let text = std::fs::read_to_string(file).map_err(|source| ValidateError::Read {
        path: file.display().to_string(),
        source,
    })?;

    match validate(kind, truncated, &text) {
        Ok(json) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{json}");
            }
            Ok(())
        }
        Err(ValidateError::Rejected { category, source }) => {
            if let PipelineError::MalformedJson {
                offset, context, ..
            } = &source
            {
                tracing::error!(offset = ?offset, "Context: {context}");
            }
            if let Some(field) = source.field() {
                tracing::error!(field, "Offending field");
            }
            Err(ValidateError::Rejected { category, source })
        }
        Err(e) => Err(e),
    }
}

/// Run `text` through the pipeline as a `kind` reply.
///
/// # Errors
///
/// Returns `ValidateError::Rejected` with the pipeline's diagnostic.
pub fn validate(kind: RecordKind, truncated: bool, text: &str) -> Result<String, ValidateError> {
    let stop_reason = if truncated {
        StopReason::LengthTruncated
    } else {
        StopReason::Complete
    };
    let reply = RawModelReply::new(text, stop_reason, "offline");

    match kind {
        RecordKind::Product => pretty(&ingest::<ProductSuggestion>(&reply)?),
        RecordKind::Bundle => pretty(&ingest::<BundleProposal>(&reply)?),
        RecordKind::Announcement => pretty(&ingest::<Announcement>(&reply)?),
    }
}

fn pretty<T: Serialize>(record: &T) -> Result<String, ValidateError> {
    Ok(serde_json::to_string_pretty(record)?)
}
