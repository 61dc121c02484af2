//! Path validation — filesystem sandboxing to a root directory.
//!
//! Ensures file tools can only read paths that resolve inside the configured
//! root, after symlinks and relative components are resolved.

use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Error returned when path validation fails.
#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    #[error("Path '{path}' is outside the allowed root")]
    OutsideRoot { path: String },

    #[error("Path traversal detected in '{path}'")]
    PathTraversal { path: String },

    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Failed to canonicalize path '{path}': {reason}")]
    CanonicalizeFailed { path: String, reason: String },
}

/// Validate that `path` resolves to an existing entry inside `root`.
///
/// Relative paths are resolved against `root`. Returns the canonical path on
/// success.
pub fn validate_path(path: &str, root: &Path) -> Result<PathBuf, PathValidationError> {
    let input = Path::new(path);
    let joined = if input.is_absolute() {
        input.to_path_buf()
    } else {
        root.join(input)
    };

    let canonical_root = root
        .canonicalize()
        .map_err(|e| PathValidationError::CanonicalizeFailed {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

    let canonical = match joined.canonicalize() {
        Ok(p) => p,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // Report escapes before reporting a missing file
            if input.components().any(|c| c == Component::ParentDir) {
                return Err(PathValidationError::PathTraversal { path: path.into() });
            }
            return Err(PathValidationError::NotFound { path: path.into() });
        }
        Err(e) => {
            return Err(PathValidationError::CanonicalizeFailed {
                path: path.into(),
                reason: e.to_string(),
            });
        }
    };

    if !canonical.starts_with(&canonical_root) {
        warn!(path = %path, root = %canonical_root.display(), "Path outside allowed root");
        return Err(PathValidationError::OutsideRoot { path: path.into() });
    }

    Ok(canonical)
}
