//! Utility modules shared by the whole crate.
//!
//! - Error types
//! - Process-wide context (default precision and id counter)

pub mod context;
pub mod errors;

// Re-exports
pub use context::{default_precision, fresh_id, set_default_precision, ScopContext};
pub use errors::*;
