//! Channel model.
//!
//! A minimal stand-in for the platform's channel objects: a named session
//! holding variables behind an exclusive lock, and a registry to find
//! channels by name.

mod registry;
mod session;

pub use registry::{ChannelRegistry, InMemoryChannels};
pub use session::{Channel, ChannelGuard};
