//! PBX BackTicks and DeleteConfig modules.
//!
//! `BackTicks` runs a command line and exposes its output as a channel
//! variable, a dialplan function value and a management action response.
//! `DeleteConfig` deletes a file in the configuration directory through a
//! management action. The host platform's module system, channels and
//! management interface are modelled by [`modules::Host`],
//! [`channel::ChannelRegistry`] and [`manager`].

pub mod audit;
pub mod channel;
pub mod config;
pub mod error;
pub mod executor;
pub mod manager;
pub mod modules;
pub mod validation;
