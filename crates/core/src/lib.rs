//! Launchkit Core - model reply ingestion and shared domain types.
//!
//! This crate is used by:
//! - `server` - Shopify-facing HTTP backend
//! - `cli` - Migration and diagnostics tooling
//!
//! # Architecture
//!
//! The core crate contains only pure logic - no I/O, no database access,
//! no HTTP clients. Everything here can run in a unit test without a
//! network or a runtime.
//!
//! # Modules
//!
//! - [`ingest`] - Prompt building and the reply pipeline
//!   (extract -> decode -> normalize -> validated record)
//! - [`intent`] - Keyword intent detection for the assistant prompt box
//! - [`types`] - Newtypes for shop domains and bundle pricing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ingest;
pub mod intent;
pub mod types;

pub use ingest::{
    Announcement, BundleProposal, FailureCategory, PipelineError, ProductSuggestion,
    RawModelReply, StopReason, Usage, Validated, ingest, revalidate,
};
pub use types::*;
