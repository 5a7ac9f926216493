//! Sub-project discovery
//!
//! The order returned by a [`SubprojectSource`] is the ownership priority
//! order: the first sub-project to claim a project name owns it.

use crate::error::DiscoveryError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sublink_model::RelPath;

/// Submodule configuration file read by [`GitModules`]
pub const GITMODULES_FILE_NAME: &str = ".gitmodules";

static SUBMODULE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*path[ \t]*=[ \t]*"?(?P<path>[^"\r\n]*?)"?[ \t]*\r?$"#)
        .expect("submodule path pattern must compile")
});

/// Supplies the ordered list of sub-project directories for a workspace
pub trait SubprojectSource: Debug + Send + Sync {
    /// Sub-project directories relative to `root`, in priority order
    ///
    /// # Errors
    /// Returns error if the underlying configuration cannot be read
    fn subprojects(&self, root: &Path) -> Result<Vec<RelPath>, DiscoveryError>;
}

/// Fixed list of sub-project directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSubprojects {
    dirs: Vec<PathBuf>,
}

impl StaticSubprojects {
    /// Create from directories relative to the workspace root
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dirs: impl IntoIterator<Item = P>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }
}

impl SubprojectSource for StaticSubprojects {
    fn subprojects(&self, root: &Path) -> Result<Vec<RelPath>, DiscoveryError> {
        let mut out = Vec::with_capacity(self.dirs.len());
        for dir in &self.dirs {
            push_unique(&mut out, RelPath::within(root, dir)?);
        }
        Ok(out)
    }
}

/// Reads `path = ...` entries from the workspace's `.gitmodules`, in file order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GitModules;

impl GitModules {
    /// Extract submodule paths from `.gitmodules` content
    #[must_use]
    pub fn parse(content: &str) -> Vec<RelPath> {
        let mut out = Vec::new();
        for caps in SUBMODULE_PATH.captures_iter(content) {
            let path = caps["path"].trim();
            if path.is_empty() {
                continue;
            }
            let dir = RelPath::parse(path);
            if dir.escapes_root() || dir.is_root() {
                tracing::warn!(path, "ignoring submodule path outside the workspace");
                continue;
            }
            push_unique(&mut out, dir);
        }
        out
    }
}

impl SubprojectSource for GitModules {
    fn subprojects(&self, root: &Path) -> Result<Vec<RelPath>, DiscoveryError> {
        let path = root.join(GITMODULES_FILE_NAME);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(root = %root.display(), "no .gitmodules; no sub-projects");
                Ok(Vec::new())
            }
            Err(e) => Err(DiscoveryError::io_error(path, e)),
        }
    }
}

fn push_unique(out: &mut Vec<RelPath>, dir: RelPath) {
    if !out.contains(&dir) {
        out.push(dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sublink_test_utils::TempWorkspace;

    const GITMODULES: &str = "[submodule \"core\"]\n\tpath = libs/Core\n\turl = https://example.com/core.git\n[submodule \"net\"]\n\tpath = libs/Net\n\turl = ../net.git\n";

    #[test]
    fn parses_paths_in_file_order() {
        assert_eq!(
            GitModules::parse(GITMODULES),
            vec![RelPath::parse("libs/Core"), RelPath::parse("libs/Net")]
        );
    }

    #[test]
    fn handles_crlf_and_quotes() {
        let content = "[submodule \"a\"]\r\n  path = \"vendor/A\"\r\n  url = x\r\n";
        assert_eq!(GitModules::parse(content), vec![RelPath::parse("vendor/A")]);
    }

    #[test]
    fn ignores_escaping_and_duplicate_paths() {
        let content = "path = ../outside\npath = libs/A\npath = libs/A/\n";
        assert_eq!(GitModules::parse(content), vec![RelPath::parse("libs/A")]);
    }

    #[test]
    fn missing_gitmodules_is_empty() {
        let ws = TempWorkspace::new();
        assert!(GitModules.subprojects(ws.root()).unwrap().is_empty());
    }

    #[test]
    fn reads_gitmodules_from_root() {
        let ws = TempWorkspace::new();
        ws.write(GITMODULES_FILE_NAME, GITMODULES);
        assert_eq!(GitModules.subprojects(ws.root()).unwrap().len(), 2);
    }

    #[test]
    fn static_list_keeps_order() {
        let ws = TempWorkspace::new();
        let source = StaticSubprojects::new(["libs/Net", "libs/Core", "libs/Net"]);
        assert_eq!(
            source.subprojects(ws.root()).unwrap(),
            vec![RelPath::parse("libs/Net"), RelPath::parse("libs/Core")]
        );
    }

    #[test]
    fn static_list_accepts_absolute_inside_root() {
        let ws = TempWorkspace::new();
        let source = StaticSubprojects::new([ws.path("libs/Core")]);
        assert_eq!(source.subprojects(ws.root()).unwrap(), vec![RelPath::parse("libs/Core")]);
    }

    #[test]
    fn static_list_rejects_absolute_outside_root() {
        let ws = TempWorkspace::new();
        let other = TempWorkspace::new();
        let source = StaticSubprojects::new([other.path("libs")]);
        assert!(matches!(
            source.subprojects(ws.root()),
            Err(DiscoveryError::InvalidPath(_))
        ));
    }
}
