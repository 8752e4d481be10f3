//! CLI command implementations.

pub mod migrate;
pub mod ping;
pub mod validate;
