//! Error types for the PBX modules.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the modules.
#[derive(Error, Debug)]
pub enum ModuleError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors (bad arguments, missing headers, refused input).
    #[error("Validation error: {kind}")]
    Validation { kind: ValidationErrorKind },

    /// Command execution errors.
    #[error("Command error: {kind}")]
    Command { kind: CommandErrorKind },

    /// Channel lookup and variable errors.
    #[error("Channel error: {kind}")]
    Channel { kind: ChannelErrorKind },

    /// Module registration errors.
    #[error("Registration error: {message}")]
    Registration { message: String },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (audit entries).
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModuleError {
    /// Short machine-readable code, used in audit entries.
    pub fn code(&self) -> &'static str {
        match self {
            ModuleError::Config { .. } => "CONFIG_ERROR",
            ModuleError::Validation { .. } => "VALIDATION_ERROR",
            ModuleError::Command {
                kind: CommandErrorKind::Timeout { .. },
            } => "TIMEOUT",
            ModuleError::Command { .. } => "COMMAND_ERROR",
            ModuleError::Channel { .. } => "CHANNEL_ERROR",
            ModuleError::Registration { .. } => "REGISTRATION_ERROR",
            ModuleError::Io(_) => "IO_ERROR",
            ModuleError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the error was caused by the request rather than by execution.
    pub fn is_validation(&self) -> bool {
        matches!(self, ModuleError::Validation { .. })
    }
}

/// Validation error kinds.
#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("Empty command line")]
    EmptyCommandLine,

    #[error("Too many arguments: {count} exceeds maximum of {max}")]
    TooManyArguments { count: usize, max: usize },

    #[error("Program must be an absolute path: {program}")]
    ProgramNotAbsolute { program: String },

    #[error("Program not allowed: {program}")]
    ProgramNotAllowed { program: String },

    #[error("Path not allowed: {path}")]
    PathNotAllowed { path: PathBuf },

    #[error("Path traversal detected in: {path}")]
    PathTraversal { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Invalid variable name: {name}")]
    InvalidVariableName { name: String },

    #[error("Missing required parameter: {param}")]
    MissingParameter { param: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("{usage}")]
    Usage { usage: String },
}

/// Command error kinds.
#[derive(Error, Debug)]
pub enum CommandErrorKind {
    #[error("Unknown {item}: {name}")]
    Unknown { item: &'static str, name: String },

    #[error("Command execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("Command timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Command produced no output")]
    NoOutput,
}

/// Channel error kinds.
#[derive(Error, Debug)]
pub enum ChannelErrorKind {
    #[error("No such channel: {name}")]
    NotFound { name: String },

    #[error("Channel lock poisoned: {name}")]
    LockPoisoned { name: String },
}

/// Result type alias for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;
