//! Workspace-relative path algebra
//!
//! Provides [`RelPath`], a lexically normalized path anchored at the workspace
//! root, plus the classification helpers used to decide whether a descriptor
//! value may be rewritten at all.
//!
//! Descriptor files are produced on one platform and consumed on another, so
//! values are split on both `/` and `\` and never touch the filesystem.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path, PathBuf};

/// Path separator used when rendering a [`RelPath`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// `\` - MSBuild convention
    #[default]
    Backslash,
    /// `/`
    Slash,
}

impl Separator {
    /// Character for this separator
    #[inline]
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Backslash => '\\',
            Self::Slash => '/',
        }
    }

    /// Detect the separator style of an existing value
    ///
    /// Returns `None` when the value contains no separator at all.
    #[must_use]
    pub fn detect(value: &str) -> Option<Self> {
        value.chars().find_map(|c| match c {
            '\\' => Some(Self::Backslash),
            '/' => Some(Self::Slash),
            _ => None,
        })
    }
}

/// Classification of a path-bearing value found in a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Empty or whitespace-only
    Empty,
    /// Contains a build macro (`$(...)`, `%(...)`), resolved by the build tool
    Macro,
    /// Drive-letter, network-share or rooted path
    Absolute,
    /// Relative to the descriptor's directory
    Relative,
}

impl PathKind {
    /// Classify a raw value
    ///
    /// # Examples
    /// - `C:\libs\Foo.dll` → `Absolute`
    /// - `\\server\share\Foo.dll` → `Absolute`
    /// - `$(SolutionDir)Foo.dll` → `Macro`
    /// - `libs\Foo.dll` → `Relative`
    #[must_use]
    pub fn classify(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return Self::Empty;
        }
        if value.contains("$(") || value.contains("%(") {
            return Self::Macro;
        }
        let bytes = value.as_bytes();
        if bytes[0] == b'/' || bytes[0] == b'\\' {
            return Self::Absolute;
        }
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            return Self::Absolute;
        }
        Self::Relative
    }

    /// Only relative values are ever rewritten
    #[inline]
    #[must_use]
    pub fn is_rewritable(self) -> bool {
        matches!(self, Self::Relative)
    }
}

/// Lexically normalized path relative to the workspace root
///
/// `.` segments are dropped and `..` segments cancel the preceding segment.
/// A `..` that cannot cancel anything is kept as a leading "up" count, so a
/// value such as `../Shared/Foo.dll` stays representable.
///
/// # Examples
/// - `libs\Core\..\Foo.dll` → `libs/Foo.dll`
/// - `../Shared` → one up, `Shared`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RelPath {
    ups: usize,
    segments: Vec<String>,
}

impl RelPath {
    /// The workspace root itself
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a raw value, accepting both separator styles
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::root().join(value)
    }

    /// Convert a filesystem path relative to the workspace root
    ///
    /// # Errors
    /// Returns error if `path` is absolute
    pub fn from_path(path: &Path) -> Result<Self, PathError> {
        let mut out = Self::root();
        for component in path.components() {
            match component {
                Component::Normal(seg) => out.push(&seg.to_string_lossy()),
                Component::CurDir => {}
                Component::ParentDir => out.pop_or_ascend(),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathError::Absolute(path.display().to_string()));
                }
            }
        }
        Ok(out)
    }

    /// Express `path` relative to `root`
    ///
    /// Relative inputs are taken as already relative to `root`.
    ///
    /// # Errors
    /// Returns error if `path` is absolute but not inside `root`
    pub fn within(root: &Path, path: &Path) -> Result<Self, PathError> {
        if path.is_absolute() {
            let stripped = path
                .strip_prefix(root)
                .map_err(|_| PathError::OutsideRoot {
                    path: path.display().to_string(),
                    root: root.display().to_string(),
                })?;
            Self::from_path(stripped)
        } else {
            Self::from_path(path)
        }
    }

    /// Resolve `value` with `self` as the base directory
    #[must_use]
    pub fn join(&self, value: &str) -> Self {
        let mut out = self.clone();
        for seg in value.split(['/', '\\']) {
            match seg.trim() {
                "" | "." => {}
                ".." => out.pop_or_ascend(),
                _ => out.push(seg),
            }
        }
        out
    }

    /// Number of leading `..` components
    #[inline]
    #[must_use]
    pub fn ups(&self) -> usize {
        self.ups
    }

    /// Named segments after the leading `..` components
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Check if this is the workspace root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.ups == 0 && self.segments.is_empty()
    }

    /// Check if this path lies above the workspace root
    #[inline]
    #[must_use]
    pub fn escapes_root(&self) -> bool {
        self.ups > 0
    }

    /// Last named segment
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent directory (`None` at the root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut parent = self.clone();
        parent.pop_or_ascend();
        Some(parent)
    }

    /// Express `self` relative to the directory `base`
    ///
    /// Resolving the result from `base` with [`RelPath::join`] yields `self`
    /// again.
    ///
    /// # Errors
    /// Returns error if `base` climbs higher above the root than `self` does,
    /// since the names of those directories are unknown
    pub fn relative_from(&self, base: &Self) -> Result<Self, PathError> {
        if base.ups > self.ups {
            return Err(PathError::Unanchored {
                path: self.to_string(),
                base: base.to_string(),
            });
        }
        // Both share `base.ups` leading ups; the target's extra ups sit
        // in front of its segments and can never match a base segment.
        let common = if base.ups == self.ups {
            base.segments
                .iter()
                .zip(&self.segments)
                .take_while(|(a, b)| a == b)
                .count()
        } else {
            0
        };
        Ok(Self {
            ups: (base.segments.len() - common) + (self.ups - base.ups),
            segments: self.segments[common..].to_vec(),
        })
    }

    /// Materialize as a native path under `root`
    #[must_use]
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut out = root.to_path_buf();
        for _ in 0..self.ups {
            out.pop();
        }
        out.extend(&self.segments);
        out
    }

    /// Render with the given separator
    ///
    /// The root renders as `.` so the result is never empty.
    #[must_use]
    pub fn render(&self, separator: Separator) -> String {
        if self.is_root() {
            return ".".to_string();
        }
        std::iter::repeat("..")
            .take(self.ups)
            .chain(self.segments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(&separator.as_char().to_string())
    }

    fn push(&mut self, segment: &str) {
        self.segments.push(segment.to_string());
    }

    fn pop_or_ascend(&mut self) {
        if self.segments.pop().is_none() {
            self.ups += 1;
        }
    }
}

impl Display for RelPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Separator::Slash))
    }
}

/// Errors related to workspace-relative paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// An absolute path where a relative one was required
    #[error("path '{0}' is absolute")]
    Absolute(String),

    /// An absolute path outside the workspace root
    #[error("path '{path}' is outside workspace root '{root}'")]
    OutsideRoot { path: String, root: String },

    /// Base directory lies above the target's anchor
    #[error("cannot express '{path}' relative to '{base}'")]
    Unanchored { path: String, base: String },
}
