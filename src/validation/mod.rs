//! Input validation module.
//!
//! Provides validators for program paths, config file names and channel
//! variable names.

mod path;
mod variable_name;
pub mod whitelist;

pub use path::resolve_config_path;
pub use variable_name::validate_variable_name;
pub use whitelist::ProgramAllowlist;
