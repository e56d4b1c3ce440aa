//! DeleteConfig module: deletes a file in the configuration directory.

mod action;

use std::path::PathBuf;
use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::error::ModuleError;

use super::host::Registrar;
use super::traits::Module;

pub use action::{DeleteConfigAction, DELETED_MESSAGE};

/// The DeleteConfig module.
pub struct DeleteConfigModule {
    config_dir: PathBuf,
    audit: Option<Arc<AuditLogger>>,
}

impl DeleteConfigModule {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }
}

impl Module for DeleteConfigModule {
    fn name(&self) -> &'static str {
        "deleteconfig"
    }

    fn description(&self) -> &'static str {
        "DeleteConfig Command"
    }

    fn load(&self, registrar: &mut Registrar) -> Result<(), ModuleError> {
        let mut action = DeleteConfigAction::new(self.config_dir.clone());
        if let Some(audit) = &self.audit {
            action = action.with_audit(Arc::clone(audit));
        }
        registrar.action(Arc::new(action));
        Ok(())
    }
}
