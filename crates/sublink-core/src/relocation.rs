//! Relocation executor
//!
//! Places a descriptor inside its owning sub-project as a hard link to the
//! root-level file, so both paths share one copy of the data. Failures are
//! reported as [`RelocationOutcome::Skipped`]; the root copy stays
//! authoritative.

use crate::error::RelocationError;
use std::fmt::{self, Debug, Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates a second directory entry for an existing file
pub trait Linker: Debug + Send + Sync {
    /// Make `link` refer to the same data as `original`
    ///
    /// # Errors
    /// Returns error if the platform or filesystem refuses the link
    fn link(&self, original: &Path, link: &Path) -> io::Result<()>;
}

/// Filesystem hard links
#[derive(Debug, Clone, Copy, Default)]
pub struct HardLinker;

impl Linker for HardLinker {
    fn link(&self, original: &Path, link: &Path) -> io::Result<()> {
        fs::hard_link(original, link)
    }
}

/// What happened to one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    /// Target now links to the original
    Linked {
        original: PathBuf,
        target: PathBuf,
        /// Original was written first because it did not exist yet
        materialized: bool,
    },
    /// Computed but not performed (dry run)
    Planned { original: PathBuf, target: PathBuf },
    /// Relocation abandoned; the root copy stands
    Skipped { target: PathBuf, reason: String },
}

impl RelocationOutcome {
    /// Relocated target path
    #[must_use]
    pub fn target(&self) -> &Path {
        match self {
            Self::Linked { target, .. } | Self::Planned { target, .. } | Self::Skipped { target, .. } => {
                target
            }
        }
    }

    /// Check if the link was established
    #[inline]
    #[must_use]
    pub fn is_linked(&self) -> bool {
        matches!(self, Self::Linked { .. })
    }
}

impl Display for RelocationOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linked { original, target, .. } => {
                write!(f, "linked {} -> {}", target.display(), original.display())
            }
            Self::Planned { original, target } => {
                write!(f, "would link {} -> {}", target.display(), original.display())
            }
            Self::Skipped { target, reason } => {
                write!(f, "skipped {}: {reason}", target.display())
            }
        }
    }
}

/// Performs relocations through a [`Linker`]
#[derive(Debug)]
pub struct RelocationExecutor {
    linker: Box<dyn Linker>,
}

impl Default for RelocationExecutor {
    fn default() -> Self {
        Self::new(Box::new(HardLinker))
    }
}

impl RelocationExecutor {
    /// Create executor with a specific linker
    #[must_use]
    pub fn new(linker: Box<dyn Linker>) -> Self {
        Self { linker }
    }

    /// Relocate, converting any failure into a warning and a skipped outcome
    ///
    /// `content` is written to `original` only when it does not exist yet.
    pub fn relocate(&self, original: &Path, target: &Path, content: &str) -> RelocationOutcome {
        match self.try_relocate(original, target, content) {
            Ok(materialized) => {
                tracing::info!(
                    original = %original.display(),
                    target = %target.display(),
                    materialized,
                    "relocated descriptor"
                );
                RelocationOutcome::Linked {
                    original: original.to_path_buf(),
                    target: target.to_path_buf(),
                    materialized,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "descriptor relocation skipped; root copy remains in place");
                RelocationOutcome::Skipped {
                    target: target.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Relocate, returning whether the original had to be materialized
    ///
    /// # Errors
    /// Returns error on the first failing step; earlier steps are not undone
    pub fn try_relocate(&self, original: &Path, target: &Path, content: &str) -> Result<bool, RelocationError> {
        if original == target {
            return Err(RelocationError::SameLocation(target.to_path_buf()));
        }

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|source| RelocationError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let materialized = !original.exists();
        if materialized {
            fs::write(original, content).map_err(|source| RelocationError::Materialize {
                path: original.to_path_buf(),
                source,
            })?;
        }

        if fs::symlink_metadata(target).is_ok() {
            fs::remove_file(target).map_err(|source| RelocationError::Remove {
                path: target.to_path_buf(),
                source,
            })?;
        }

        self.linker
            .link(original, target)
            .map_err(|source| RelocationError::Link {
                original: original.to_path_buf(),
                target: target.to_path_buf(),
                source,
            })?;
        Ok(materialized)
    }

    /// Remove links to `original` left at `candidates` by an earlier cycle
    ///
    /// Only entries that share `original`'s data are removed; `keep` is never
    /// touched. Returns the paths that were removed.
    pub fn prune(&self, original: &Path, candidates: &[PathBuf], keep: Option<&Path>) -> Vec<PathBuf> {
        let mut removed = Vec::new();
        for candidate in candidates {
            if candidate == original || Some(candidate.as_path()) == keep || !shares_data(original, candidate) {
                continue;
            }
            match fs::remove_file(candidate) {
                Ok(()) => {
                    tracing::info!(link = %candidate.display(), "removed stale descriptor link");
                    removed.push(candidate.clone());
                }
                Err(e) => {
                    tracing::warn!(link = %candidate.display(), error = %e, "failed to remove stale descriptor link");
                }
            }
        }
        removed
    }
}

/// Check if both paths are entries for the same file
#[cfg(unix)]
fn shares_data(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::symlink_metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

/// Link identity is not observable here; nothing is ever pruned
#[cfg(not(unix))]
fn shares_data(_a: &Path, _b: &Path) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use sublink_test_utils::{same_file, TempWorkspace};

    #[derive(Debug)]
    struct RefusingLinker;

    impl Linker for RefusingLinker {
        fn link(&self, _original: &Path, _link: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no hard links here"))
        }
    }

    #[test]
    fn links_existing_original() {
        let ws = TempWorkspace::new();
        let original = ws.write("Core.csproj", "<Project />");
        let target = ws.path("libs/Core/Core.csproj");

        let outcome = RelocationExecutor::default().relocate(&original, &target, "ignored");
        assert_eq!(
            outcome,
            RelocationOutcome::Linked {
                original: original.clone(),
                target: target.clone(),
                materialized: false,
            }
        );
        assert!(same_file(&original, &target));
        assert_eq!(ws.read("Core.csproj"), "<Project />");
    }

    #[test]
    fn materializes_missing_original() {
        let ws = TempWorkspace::new();
        let original = ws.path("Core.csproj");
        let target = ws.path("libs/Core/Core.csproj");

        let materialized = RelocationExecutor::default()
            .try_relocate(&original, &target, "<Project>new</Project>")
            .unwrap();
        assert!(materialized);
        assert_eq!(ws.read("libs/Core/Core.csproj"), "<Project>new</Project>");
    }

    #[test]
    fn replaces_stale_target() {
        let ws = TempWorkspace::new();
        let original = ws.write("Core.csproj", "fresh");
        let target = ws.write("libs/Core/Core.csproj", "stale");

        RelocationExecutor::default()
            .try_relocate(&original, &target, "fresh")
            .unwrap();
        assert!(same_file(&original, &target));
        assert_eq!(ws.read("libs/Core/Core.csproj"), "fresh");
    }

    #[test]
    fn repeated_relocation_is_stable() {
        let ws = TempWorkspace::new();
        let original = ws.write("Core.csproj", "x");
        let target = ws.path("libs/Core/Core.csproj");
        let executor = RelocationExecutor::default();

        assert!(executor.relocate(&original, &target, "x").is_linked());
        assert!(executor.relocate(&original, &target, "x").is_linked());
        assert!(same_file(&original, &target));
    }

    #[test]
    fn link_failure_is_skipped() {
        let ws = TempWorkspace::new();
        let original = ws.write("Core.csproj", "x");
        let target = ws.path("libs/Core/Core.csproj");

        let outcome = RelocationExecutor::new(Box::new(RefusingLinker)).relocate(&original, &target, "x");
        match outcome {
            RelocationOutcome::Skipped { reason, .. } => assert!(reason.contains("no hard links here")),
            other => panic!("expected skip, got {other:?}"),
        }
        assert!(ws.exists("Core.csproj"));
        assert!(!ws.exists("libs/Core/Core.csproj"));
    }

    #[test]
    fn directory_creation_failure_is_reported() {
        let ws = TempWorkspace::new();
        let original = ws.write("Core.csproj", "x");
        ws.write("libs", "a file where a directory should be");
        let target = ws.path("libs/Core/Core.csproj");

        let err = RelocationExecutor::default()
            .try_relocate(&original, &target, "x")
            .unwrap_err();
        assert!(matches!(err, RelocationError::CreateDir { .. }));
    }

    #[test]
    fn same_location_is_refused() {
        let ws = TempWorkspace::new();
        let original = ws.write("Core.csproj", "x");
        let err = RelocationExecutor::default()
            .try_relocate(&original, &original, "x")
            .unwrap_err();
        assert!(matches!(err, RelocationError::SameLocation(_)));
    }

    #[cfg(unix)]
    #[test]
    fn prune_removes_only_stale_links() {
        let ws = TempWorkspace::new();
        let original = ws.write("Core.csproj", "x");
        let executor = RelocationExecutor::default();
        let old = ws.path("libs/Old/Core.csproj");
        let current = ws.path("libs/New/Core.csproj");
        assert!(executor.relocate(&original, &old, "x").is_linked());
        assert!(executor.relocate(&original, &current, "x").is_linked());
        let unrelated = ws.write("libs/Other/Core.csproj", "x");

        let candidates = vec![old.clone(), current.clone(), unrelated, ws.path("libs/Missing/Core.csproj")];
        let removed = executor.prune(&original, &candidates, Some(&current));

        assert_eq!(removed, vec![old]);
        assert!(!ws.exists("libs/Old/Core.csproj"));
        assert!(same_file(&original, &current));
        assert_eq!(ws.read("libs/Other/Core.csproj"), "x");
    }

    #[test]
    fn outcome_display() {
        let outcome = RelocationOutcome::Skipped {
            target: PathBuf::from("libs/Core/Core.csproj"),
            reason: "denied".to_string(),
        };
        assert_eq!(outcome.to_string(), "skipped libs/Core/Core.csproj: denied");
        assert_eq!(outcome.target(), Path::new("libs/Core/Core.csproj"));
    }
}
