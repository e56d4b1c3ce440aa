//! `DeleteConfig` manager action.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use nix::errno::Errno;
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::error::{ModuleError, ValidationErrorKind};
use crate::manager::{ManagerMessage, ManagerResponse};
use crate::modules::traits::ManagerAction;
use crate::modules::types::{ExecutionContext, Invocation};
use crate::validation::resolve_config_path;

/// Acknowledgement text on successful deletion.
pub const DELETED_MESSAGE: &str = "Configuration file deleted successfully";

/// Delete `<config_dir>/<Filename>`.
///
/// # Headers
///
/// - `Filename` (required): path relative to the config directory
///
/// # Notes
///
/// - Success is reported only when the file was actually removed; a
///   missing file is an error carrying the OS error description
/// - Directories, symlinks and names leaving the config directory are refused
pub struct DeleteConfigAction {
    config_dir: PathBuf,
    audit: Option<Arc<AuditLogger>>,
}

/// OS error description without the "(os error N)" suffix.
fn describe(error: &io::Error) -> String {
    match error.raw_os_error() {
        Some(code) => Errno::from_raw(code).desc().to_string(),
        None => error.to_string(),
    }
}

impl DeleteConfigAction {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    fn delete(&self, filename: &str) -> Result<PathBuf, ModuleError> {
        let path = resolve_config_path(&self.config_dir, filename)?;

        if path.is_dir() {
            return Err(ModuleError::Validation {
                kind: ValidationErrorKind::NotAFile { path },
            });
        }

        debug!(path = %path.display(), "Deleting config file");
        fs::remove_file(&path)?;
        Ok(path)
    }
}

impl ManagerAction for DeleteConfigAction {
    fn name(&self) -> &'static str {
        "DeleteConfig"
    }

    fn synopsis(&self) -> &'static str {
        "Delete a config file."
    }

    fn description(&self) -> &'static str {
        "Delete a config file"
    }

    fn execute(&self, message: &ManagerMessage) -> ManagerResponse {
        let ctx = ExecutionContext::new(Invocation::Manager);
        let filename = message.header("Filename").unwrap_or_default();
        let subject = serde_json::json!({ "filename": filename });

        let response = match self.delete(filename) {
            Ok(path) => {
                info!(
                    request_id = %ctx.request_id,
                    path = %path.display(),
                    "Config file deleted"
                );
                if let Some(audit) = &self.audit {
                    audit.record(&AuditEntry::success(
                        &ctx,
                        "delete_config",
                        subject,
                        Some(serde_json::json!({ "path": path.to_string_lossy() })),
                    ));
                }
                ManagerResponse::ack(DELETED_MESSAGE)
            }
            Err(e) => {
                warn!(request_id = %ctx.request_id, filename = filename, error = %e, "DeleteConfig failed");
                if let Some(audit) = &self.audit {
                    audit.record(&AuditEntry::failure(
                        &ctx,
                        "delete_config",
                        subject,
                        e.code(),
                        e.to_string(),
                    ));
                }
                let text = match &e {
                    ModuleError::Io(io_error) => describe(io_error),
                    ModuleError::Validation {
                        kind: ValidationErrorKind::MissingParameter { .. },
                    } => "Filename not specified".to_string(),
                    ModuleError::Validation { kind } => kind.to_string(),
                    other => other.to_string(),
                };
                ManagerResponse::error(text)
            }
        };

        response.with_action_id(message.action_id())
    }
}
