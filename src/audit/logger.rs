//! Audit logger for writing audit entries to file.
//!
//! Writes one JSON object per line.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::ModuleError;

use super::entry::AuditEntry;

/// Append-only JSON lines audit log.
pub struct AuditLogger {
    file: Mutex<File>,
    path: PathBuf,
}

impl AuditLogger {
    /// Open (or create) the audit log at `path`, creating parent directories.
    pub fn new(path: &Path) -> Result<Self, ModuleError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                debug!(path = %parent.display(), "Creating audit log directory");
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        debug!(path = %path.display(), "Audit logger initialized");

        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Write one entry and sync it to disk.
    pub fn log(&self, entry: &AuditEntry) -> Result<(), ModuleError> {
        let json = serde_json::to_string(entry)?;

        let mut file = self.file.lock().map_err(|e| ModuleError::Config {
            message: format!("Failed to acquire audit log lock: {}", e),
        })?;

        writeln!(file, "{}", json)?;

        if let Err(e) = file.sync_data() {
            warn!(error = %e, "Failed to sync audit log");
        }

        Ok(())
    }

    /// Write an entry, logging instead of returning failures.
    pub fn record(&self, entry: &AuditEntry) {
        if let Err(e) = self.log(entry) {
            warn!(
                request_id = %entry.request_id,
                error = %e,
                "Failed to write audit entry"
            );
        }
    }

    /// Get the path to the audit log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
