//! Error types used across Roundhouse.
//!
//! The taxonomy follows the engine's failure policy:
//! - configuration errors are raised before any filesystem mutation begins;
//! - resource errors (space, platform, missing parameters) abort the install
//!   and are wrapped with the service name that raised them;
//! - I/O errors propagate except where an operation is explicitly idempotent
//!   (removing an already-absent target is success);
//! - rollback failures are collected and reported alongside the original
//!   triggering error, never in place of it.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or inconsistent configuration, detected before execution.
    #[error("configuration error: {0}")]
    Config(String),

    /// A service task failed; carries the service name for context.
    #[error("task `{service}` failed: {source}")]
    Task {
        service: String,
        #[source]
        source: Box<Error>,
    },

    /// Not enough free space under the installation top.
    #[error("Insufficient room under {}: need {needed} bytes, have {available}", path.display())]
    InsufficientSpace {
        path: PathBuf,
        needed: u64,
        available: u64,
    },

    /// The host platform is not in the package's supported set.
    #[error("unsupported platform `{found}`, supported: {}", supported.join(", "))]
    UnsupportedPlatform {
        found: String,
        supported: Vec<String>,
    },

    /// An interactive query produced no usable value.
    #[error("missing required parameter `{0}`")]
    MissingParameter(String),

    /// A shell-backed OS operation failed (non-zero exit status).
    #[error("os command failed: {0}")]
    Os(String),

    /// Path validation failure (escapes root, contains `..`).
    #[error("invalid path: {0}")]
    Path(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The install failed and was rolled back. Reversal failures, if any, are
    /// carried alongside the original cause; neither masks the other.
    #[error("{}", render_reverted(original, rollback_errors))]
    Reverted {
        original: Box<Error>,
        rollback_errors: Vec<String>,
    },

    /// A standalone removal pass completed with failures.
    #[error("package removal finished with {} failure(s): {}", failures.len(), failures.join("; "))]
    Removal { failures: Vec<String> },
}

fn render_reverted(original: &Error, rollback_errors: &[String]) -> String {
    if rollback_errors.is_empty() {
        format!("install failed and was reverted: {original}")
    } else {
        format!(
            "install failed: {original}; {} rollback error(s): {}",
            rollback_errors.len(),
            rollback_errors.join("; ")
        )
    }
}

impl Error {
    /// The root cause of a rolled-back install, unwrapping the aggregate.
    #[must_use]
    pub fn original(&self) -> &Error {
        match self {
            Error::Reverted { original, .. } => original,
            other => other,
        }
    }
}

/// Convenient alias for results returning a Roundhouse error.
pub type Result<T> = std::result::Result<T, Error>;

/// True when an I/O error means "the path does not exist".
/// Remove-type operations treat this as success.
#[must_use]
pub fn is_not_found(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::NotFound
}
