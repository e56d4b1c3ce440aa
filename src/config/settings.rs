//! Configuration settings for the BackTicks and DeleteConfig modules.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ModuleError;

/// Upper bound for the capture buffer.
pub const MAX_OUTPUT_BYTES_LIMIT: usize = 1_048_576;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Command execution configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum run time of a single command, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Capacity of the stdout capture buffer.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    /// Absolute paths of the programs that may be executed.
    #[serde(default)]
    pub allowed_programs: Vec<PathBuf>,
    /// Disable the allow-list entirely. Any absolute program may run.
    #[serde(default)]
    pub allow_any_program: bool,
    /// Start children with an empty environment (plus `env`).
    #[serde(default)]
    pub clear_env: bool,
    /// Extra environment variables passed to every child.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Paths configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// The platform's configuration directory (DeleteConfig root).
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Whether audit logging is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Path to the audit log file.
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_output_bytes() -> usize {
    1024
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("/etc/asterisk")
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("/var/log/asterisk/backticks-audit.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_output_bytes: default_max_output_bytes(),
            allowed_programs: Vec::new(),
            allow_any_program: false,
            clear_env: false,
            env: HashMap::new(),
        }
    }
}

impl ExecutorConfig {
    /// The command timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ModuleError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ModuleError::Config { message } => ModuleError::Config {
                message: format!("{} ({})", message, path.display()),
            },
            other => other,
        })
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ModuleError> {
        let settings: Settings = toml::from_str(content).map_err(|e| ModuleError::Config {
            message: format!("Failed to parse config: {}", e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), ModuleError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ModuleError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(ModuleError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        if self.executor.timeout_seconds == 0 {
            return Err(ModuleError::Config {
                message: "executor.timeout_seconds must be greater than zero".to_string(),
            });
        }

        if self.executor.max_output_bytes == 0
            || self.executor.max_output_bytes > MAX_OUTPUT_BYTES_LIMIT
        {
            return Err(ModuleError::Config {
                message: format!(
                    "executor.max_output_bytes must be between 1 and {}, got {}",
                    MAX_OUTPUT_BYTES_LIMIT, self.executor.max_output_bytes
                ),
            });
        }

        if let Some(relative) = self
            .executor
            .allowed_programs
            .iter()
            .find(|p| !p.is_absolute())
        {
            return Err(ModuleError::Config {
                message: format!(
                    "Allowed program '{}' must be an absolute path",
                    relative.display()
                ),
            });
        }

        Ok(())
    }
}
