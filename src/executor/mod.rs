//! Command executor module.
//!
//! Splits command lines, spawns the child process, captures bounded stdout
//! and enforces execution timeouts.

mod capture;
mod command_line;
mod output;
mod runner;
mod subprocess;

pub use command_line::{split_command_line, CommandLine, MAX_ARGV};
pub use output::CommandOutput;
pub use runner::CommandRunner;
pub use subprocess::SubprocessBuilder;
