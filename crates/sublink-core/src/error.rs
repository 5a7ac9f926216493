//! Error types for the sublink engine
//!
//! Provides error handling for:
//! - Configuration loading
//! - Sub-project discovery
//! - Descriptor relocation (directory creation, materialization, linking)
//!
//! None of these cross the host callback boundary; the [`crate::Relinker`]
//! logs them and falls back to unrelocated output.

use std::path::PathBuf;
use sublink_model::PathError;
use sublink_rewrite::RewriteError;

/// Errors while loading `sublink.toml`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error other than a missing file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or unknown keys
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while discovering sub-project directories
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Version-control configuration could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A declared sub-project path is not inside the workspace
    #[error("invalid sub-project path: {0}")]
    InvalidPath(#[from] PathError),
}

impl DiscoveryError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while placing a descriptor inside its owning sub-project
#[derive(Debug, thiserror::Error)]
pub enum RelocationError {
    /// Target directory could not be created
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Original descriptor could not be written before linking
    #[error("cannot materialize {path}: {source}")]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stale file at the target could not be removed
    #[error("cannot replace {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Link creation failed (cross-volume, permissions, unsupported filesystem)
    #[error("cannot link {target} to {original}: {source}")]
    Link {
        original: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target and original are the same path
    #[error("relocation target is the original descriptor: {0}")]
    SameLocation(PathBuf),
}

/// Combined engine error
#[derive(Debug, thiserror::Error)]
pub enum SublinkError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("relocation error: {0}")]
    Relocation(#[from] RelocationError),

    #[error("rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SublinkError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for engine operations
pub type SublinkResult<T> = Result<T, SublinkError>;
