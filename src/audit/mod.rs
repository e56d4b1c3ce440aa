//! Audit logging module.
//!
//! Records every command execution and config deletion, including refused
//! ones, as JSON lines for later review.

mod entry;
mod logger;

pub use entry::{AuditEntry, AuditResult};
pub use logger::AuditLogger;
