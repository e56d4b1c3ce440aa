//! Error types for the BackTicks and DeleteConfig modules.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
