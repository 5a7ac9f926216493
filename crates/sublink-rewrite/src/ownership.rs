//! Ownership manifest reader
//!
//! Each sub-project root may carry a plain-text manifest naming the projects
//! it owns, one per line:
//!
//! ```text
//! MySubmodule.Runtime
//! MySubmodule.Editor
//! ```

use crate::error::{RewriteError, RewriteResult};
use indexmap::IndexMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sublink_model::{Claim, OwnershipMap, RelPath};

/// Default ownership manifest file name
pub const DEFAULT_MANIFEST_FILE_NAME: &str = ".sublink";

/// Reads per-sub-project ownership manifests
#[derive(Debug, Clone)]
pub struct ManifestReader {
    file_name: String,
}

impl Default for ManifestReader {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_FILE_NAME)
    }
}

impl ManifestReader {
    /// Create reader for manifests named `file_name`
    #[inline]
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Manifest file name
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Manifest location for a sub-project directory
    #[inline]
    #[must_use]
    pub fn manifest_path(&self, subproject_dir: &Path) -> PathBuf {
        subproject_dir.join(&self.file_name)
    }

    /// Parse manifest text into distinct names, in file order
    ///
    /// Lines are trimmed, blank lines skipped, and names differing only in
    /// case collapse onto the first spelling.
    #[must_use]
    pub fn parse(content: &str) -> Vec<String> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut names: IndexMap<String, String> = IndexMap::new();
        for line in content.lines() {
            let name = line.trim();
            if !name.is_empty() {
                names
                    .entry(name.to_lowercase())
                    .or_insert_with(|| name.to_string());
            }
        }
        names.into_values().collect()
    }

    /// Read the names owned by the sub-project at `subproject_dir`
    ///
    /// A missing manifest means the sub-project owns nothing.
    ///
    /// # Errors
    /// Returns error if the manifest exists but cannot be read
    pub fn read(&self, subproject_dir: &Path) -> RewriteResult<Vec<String>> {
        let path = self.manifest_path(subproject_dir);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(manifest = %path.display(), "no ownership manifest");
                Ok(Vec::new())
            }
            Err(e) => Err(RewriteError::io_error(path, e)),
        }
    }

    /// Build the ownership map for `subprojects`, processed in the given order
    ///
    /// The first sub-project to claim a name owns it. Unreadable manifests are
    /// logged and treated as empty.
    #[must_use]
    pub fn build_map(&self, root: &Path, subprojects: &[RelPath]) -> OwnershipMap {
        let mut map = OwnershipMap::new();
        for dir in subprojects {
            let names = match self.read(&dir.to_native(root)) {
                Ok(names) => names,
                Err(e) => {
                    tracing::warn!(subproject = %dir, error = %e, "skipping unreadable ownership manifest");
                    continue;
                }
            };
            for name in names {
                if let Claim::Conflict(owner) = map.claim(&name, dir) {
                    tracing::warn!(
                        project = %name,
                        owner = %owner,
                        ignored = %dir,
                        "project claimed by more than one sub-project; keeping first owner"
                    );
                }
            }
        }
        tracing::debug!(owned = map.len(), subprojects = subprojects.len(), "built ownership map");
        map
    }
}
