//! Configuration module for the PBX modules.
//!
//! Handles loading and validating module configuration from TOML files.

mod settings;

pub use settings::*;
