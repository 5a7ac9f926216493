//! Error types for the rewriting layer
//!
//! Covers:
//! - Ownership manifest reads
//! - Descriptor rewriter construction
//! - Path anchoring of relocation targets

use std::path::PathBuf;
use sublink_model::PathError;

/// Errors while reading ownership manifests or preparing a rewrite
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// IO error other than a missing file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Element name produced an invalid pattern
    #[error("invalid element pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Descriptor or owner path could not be anchored at the workspace root
    #[error("path error: {0}")]
    Path(#[from] PathError),
}

impl RewriteError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for rewrite operations
pub type RewriteResult<T> = Result<T, RewriteError>;
