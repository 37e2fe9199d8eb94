//! Shared domain types for the Latchkey access controller.
//!
//! Everything here is free of I/O: credential identifiers, key labels,
//! trigger sources and their unlock durations, plus the validation error
//! type used at the key store boundary.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
