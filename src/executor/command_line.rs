//! Command line splitting.
//!
//! A command line is split on ASCII spaces. Runs of spaces count as one
//! separator and leading/trailing spaces are ignored. There is no quoting,
//! escaping or variable expansion: an argument can never contain a space.
//! Callers needing such arguments build a [`CommandLine`] from a vector.

use std::fmt;
use std::str::FromStr;

use crate::error::{ModuleError, ValidationErrorKind};

/// Maximum argument vector length, program included.
pub const MAX_ARGV: usize = 255;

/// A program path and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Build a command line from an already split argument vector.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Result<Self, ModuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program = program.into();
        if program.is_empty() {
            return Err(ModuleError::Validation {
                kind: ValidationErrorKind::EmptyCommandLine,
            });
        }

        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.len() + 1 > MAX_ARGV {
            return Err(ModuleError::Validation {
                kind: ValidationErrorKind::TooManyArguments {
                    count: args.len() + 1,
                    max: MAX_ARGV,
                },
            });
        }

        Ok(Self { program, args })
    }

    /// Split a space-delimited command line.
    pub fn parse(line: &str) -> Result<Self, ModuleError> {
        let mut tokens = line.split(' ').filter(|t| !t.is_empty());
        let program = tokens.next().ok_or_else(|| ModuleError::Validation {
            kind: ValidationErrorKind::EmptyCommandLine,
        })?;
        Self::new(program, tokens)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The full argument vector, program first.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl FromStr for CommandLine {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Split `line` into program and arguments.
pub fn split_command_line(line: &str) -> Result<CommandLine, ModuleError> {
    CommandLine::parse(line)
}
