//! Core types for Launchkit.
//!
//! Type-safe wrappers for the few domain values shared by the server and
//! the CLI.

pub mod price;
pub mod shop;

pub use price::{PriceError, bundle_price, parse_price};
pub use shop::{ShopDomain, ShopDomainError};
