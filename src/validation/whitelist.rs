//! Program allow-list.
//!
//! Only programs named here may be executed by the command runner. The list
//! comes from `executor.allowed_programs`; `executor.allow_any_program`
//! turns the check off.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::ExecutorConfig;
use crate::error::{ModuleError, ValidationErrorKind};

/// Set of absolute program paths permitted for execution.
#[derive(Debug, Clone, Default)]
pub struct ProgramAllowlist {
    allow_any: bool,
    programs: HashSet<PathBuf>,
}

impl ProgramAllowlist {
    /// Build the allow-list from configuration.
    pub fn from_config(config: &ExecutorConfig) -> Self {
        if config.allow_any_program {
            warn!("Program allow-list disabled, any absolute program may be executed");
        }

        Self {
            allow_any: config.allow_any_program,
            programs: config.allowed_programs.iter().cloned().collect(),
        }
    }

    /// Allow-list permitting exactly the given programs.
    pub fn new<I, P>(programs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            allow_any: false,
            programs: programs.into_iter().map(Into::into).collect(),
        }
    }

    /// Allow-list accepting any absolute program path.
    pub fn allow_any() -> Self {
        Self {
            allow_any: true,
            programs: HashSet::new(),
        }
    }

    /// Number of explicitly permitted programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Check that `program` is absolute and permitted.
    pub fn check(&self, program: &str) -> Result<(), ModuleError> {
        let path = Path::new(program);

        if !path.is_absolute() {
            return Err(ModuleError::Validation {
                kind: ValidationErrorKind::ProgramNotAbsolute {
                    program: program.to_string(),
                },
            });
        }

        if self.allow_any || self.programs.contains(path) {
            return Ok(());
        }

        warn!(program = %program, "Rejecting program not on the allow-list");
        Err(ModuleError::Validation {
            kind: ValidationErrorKind::ProgramNotAllowed {
                program: program.to_string(),
            },
        })
    }
}
