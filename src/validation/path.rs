//! Path validation for config file deletion.
//!
//! Confines a caller-supplied file name to the platform's configuration
//! directory and prevents traversal attacks.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::{ModuleError, ValidationErrorKind};

/// Check whether any component of `relative`, resolved under `root`, is a symlink.
///
/// Uses `symlink_metadata` (lstat) so links are detected rather than followed.
/// Components that do not exist yet end the walk.
fn contains_symlink(root: &Path, relative: &Path) -> Result<bool, std::io::Error> {
    let mut current = root.to_path_buf();

    for component in relative.components() {
        if let Component::Normal(name) = component {
            current.push(name);
            match std::fs::symlink_metadata(&current) {
                Ok(metadata) if metadata.file_type().is_symlink() => return Ok(true),
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
                Err(e) => return Err(e),
            }
        }
    }

    Ok(false)
}

fn traversal(filename: &str) -> ModuleError {
    ModuleError::Validation {
        kind: ValidationErrorKind::PathTraversal {
            path: PathBuf::from(filename),
        },
    }
}

/// Resolve `filename` inside the config directory `root`.
///
/// # Security Checks
///
/// 1. The file name must be non-empty and relative
/// 2. It must not contain `..` (or root/prefix) components
/// 3. No component below the root may be a symlink
/// 4. The canonical parent directory must lie within the canonical root
///
/// The file itself does not have to exist; deleting a missing file is
/// reported by the caller.
pub fn resolve_config_path(root: &Path, filename: &str) -> Result<PathBuf, ModuleError> {
    if filename.is_empty() {
        return Err(ModuleError::Validation {
            kind: ValidationErrorKind::MissingParameter {
                param: "Filename".to_string(),
            },
        });
    }

    let relative = Path::new(filename);
    let safe_components = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.is_absolute() || !safe_components {
        warn!(filename = %filename, "Rejecting config file name outside config root");
        return Err(traversal(filename));
    }

    let canonical_root = root.canonicalize().map_err(|e| {
        warn!(root = %root.display(), error = %e, "Config directory is not accessible");
        ModuleError::Validation {
            kind: ValidationErrorKind::PathNotAllowed {
                path: root.to_path_buf(),
            },
        }
    })?;

    match contains_symlink(&canonical_root, relative) {
        Ok(false) => {}
        Ok(true) => {
            warn!(filename = %filename, "Rejecting config path containing symlink");
            return Err(traversal(filename));
        }
        Err(e) => {
            warn!(filename = %filename, error = %e, "Failed to check config path for symlinks");
            return Err(ModuleError::Validation {
                kind: ValidationErrorKind::PathNotAllowed {
                    path: PathBuf::from(filename),
                },
            });
        }
    }

    let full = canonical_root.join(relative);

    if full == canonical_root {
        return Err(ModuleError::Validation {
            kind: ValidationErrorKind::NotAFile { path: full },
        });
    }

    // A missing parent means the file cannot exist either
    if let Some(parent) = full.parent() {
        if let Ok(canonical_parent) = parent.canonicalize() {
            if !canonical_parent.starts_with(&canonical_root) {
                return Err(ModuleError::Validation {
                    kind: ValidationErrorKind::PathNotAllowed { path: full },
                });
            }
        }
    }

    Ok(full)
}
