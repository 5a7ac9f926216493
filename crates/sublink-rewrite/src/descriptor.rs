//! Project descriptor rewriter
//!
//! Re-anchors the relative paths inside a project descriptor so they keep
//! pointing at the same files once the descriptor lives in another directory.
//!
//! Recognized fields:
//! - element text: `<OutputPath>`, `<HintPath>`, `<DocumentationFile>`, ...
//! - `Include` attributes: `<Compile Include="...">`, `<ProjectReference Include="...">`, ...
//!
//! The rewriter records the directory the paths are currently expressed
//! against in a one-line comment (`<!-- sublink: relocated to libs/Core -->`).
//! Later runs resolve from that directory, which makes repeated runs no-ops.

use crate::error::RewriteResult;
use crate::text::LineEnding;
use crate::warnings;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sublink_model::{PathKind, RelPath, Separator};

/// Element names whose text content is a path
pub const DEFAULT_PATH_ELEMENTS: &[&str] = &[
    "OutputPath",
    "BaseIntermediateOutputPath",
    "IntermediateOutputPath",
    "DocumentationFile",
    "HintPath",
];

/// Element names whose `Include` attribute is a path
pub const DEFAULT_INCLUDE_ELEMENTS: &[&str] = &[
    "Compile",
    "None",
    "Content",
    "EmbeddedResource",
    "Analyzer",
    "AdditionalFiles",
    "ProjectReference",
];

/// Warning codes kept suppressed by default (missing XML doc comments)
pub const DEFAULT_SUPPRESSED_WARNINGS: &[&str] = &["1573", "1591"];

const MARKER_PREFIX: &str = "<!-- sublink: relocated to ";
const MARKER_SUFFIX: &str = " -->";

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!-- sublink: relocated to (?P<dir>[^>]*?) -->")
        .expect("relocation marker pattern must compile")
});

/// How rewritten paths are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteStrategy {
    /// Relative to the descriptor's new directory; only changed values are touched
    #[default]
    Relative,
    /// Absolute filesystem paths; survives any later move but is not portable
    Absolute,
}

/// Descriptor rewriter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorOptions {
    /// Path expression strategy
    pub strategy: RewriteStrategy,
    /// Elements whose text is a path
    pub path_elements: Vec<String>,
    /// Elements whose `Include` attribute is a path
    pub include_elements: Vec<String>,
    /// Codes ensured in `<NoWarn>`
    pub suppressed_warnings: Vec<String>,
    /// Separator for values that do not already contain one
    pub separator: Separator,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        Self {
            strategy: RewriteStrategy::default(),
            path_elements: to_strings(DEFAULT_PATH_ELEMENTS),
            include_elements: to_strings(DEFAULT_INCLUDE_ELEMENTS),
            suppressed_warnings: to_strings(DEFAULT_SUPPRESSED_WARNINGS),
            separator: Separator::Backslash,
        }
    }
}

fn to_strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

/// Where a descriptor is and where it is going
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorMove {
    /// Absolute workspace root
    pub root: PathBuf,
    /// Directory the generator wrote the descriptor to
    pub from_dir: RelPath,
    /// Directory the descriptor is relocated to
    pub to_dir: RelPath,
}

impl DescriptorMove {
    /// Move between two directories under `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, from_dir: RelPath, to_dir: RelPath) -> Self {
        Self {
            root: root.into(),
            from_dir,
            to_dir,
        }
    }

    /// Move between two descriptor file paths under `root`
    ///
    /// # Errors
    /// Returns error if either path is absolute and outside `root`
    pub fn between_files(root: &Path, original: &Path, relocated: &Path) -> RewriteResult<Self> {
        let dir_of = |path: &Path| -> RewriteResult<RelPath> {
            Ok(RelPath::within(root, path)?
                .parent()
                .unwrap_or_default())
        };
        Ok(Self::new(root, dir_of(original)?, dir_of(relocated)?))
    }

    /// Check if the descriptor actually changes directory
    #[inline]
    #[must_use]
    pub fn is_relocation(&self) -> bool {
        self.from_dir != self.to_dir
    }
}

/// Result of rewriting one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorRewrite {
    /// Rewritten text
    pub text: String,
    /// Whether `text` differs from the input
    pub changed: bool,
    /// Number of path values rewritten
    pub rewritten_paths: usize,
    /// Whether `<NoWarn>` gained codes
    pub warnings_added: bool,
}

/// Rewrites path-bearing fields of project descriptors
#[derive(Debug, Clone)]
pub struct DescriptorRewriter {
    options: DescriptorOptions,
    element_pattern: Option<Regex>,
    include_pattern: Option<Regex>,
}

impl Default for DescriptorRewriter {
    fn default() -> Self {
        Self::new(DescriptorOptions::default()).expect("default element names are valid")
    }
}

fn alternation(names: &[String]) -> Option<String> {
    let names: Vec<String> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(regex::escape)
        .collect();
    (!names.is_empty()).then(|| names.join("|"))
}

impl DescriptorRewriter {
    /// Create rewriter, compiling patterns for the configured element names
    ///
    /// # Errors
    /// Returns error if the element names produce an invalid pattern
    pub fn new(options: DescriptorOptions) -> RewriteResult<Self> {
        let element_pattern = alternation(&options.path_elements)
            .map(|names| {
                Regex::new(&format!(
                    r"(?P<open><(?:{names})(?:\s[^>]*)?>)(?P<value>[^<]*)(?P<close></(?:{names})\s*>)"
                ))
            })
            .transpose()?;
        let include_pattern = alternation(&options.include_elements)
            .map(|names| {
                Regex::new(&format!(
                    r#"(?P<open><(?:{names})\s(?:[^>]*?\s)?Include\s*=\s*")(?P<value>[^"]*)(?P<close>")"#
                ))
            })
            .transpose()?;
        Ok(Self {
            options,
            element_pattern,
            include_pattern,
        })
    }

    /// Active settings
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DescriptorOptions {
        &self.options
    }

    /// Directory the descriptor's paths are currently expressed against,
    /// when a previous run recorded one
    #[must_use]
    pub fn recorded_base(text: &str) -> Option<RelPath> {
        MARKER.captures(text).map(|caps| RelPath::parse(&caps["dir"]))
    }

    /// Rewrite `text` for the move described by `mv`
    #[must_use]
    pub fn rewrite(&self, text: &str, mv: &DescriptorMove) -> DescriptorRewrite {
        let base = Self::recorded_base(text).unwrap_or_else(|| mv.from_dir.clone());
        let mut out = text.to_string();
        let mut rewritten_paths = 0;

        if base != mv.to_dir {
            let patterns = [(&self.element_pattern, false), (&self.include_pattern, true)];
            for (pattern, is_list) in patterns {
                let Some(pattern) = pattern else { continue };
                out = pattern
                    .replace_all(&out, |caps: &Captures<'_>| {
                        let rebased = if is_list {
                            self.rebase_list(&caps["value"], &base, mv)
                        } else {
                            self.rebase(&caps["value"], &base, mv).map(|value| (value, 1))
                        };
                        match rebased {
                            Some((value, count)) => {
                                rewritten_paths += count;
                                format!("{}{}{}", &caps["open"], value, &caps["close"])
                            }
                            None => caps[0].to_string(),
                        }
                    })
                    .into_owned();
            }
            out = set_marker(&out, &mv.to_dir);
            tracing::debug!(
                from = %base,
                to = %mv.to_dir,
                rewritten_paths,
                "rebased descriptor paths"
            );
        }

        let warnings_added = match warnings::ensure_suppressed(&out, &self.options.suppressed_warnings) {
            Some(updated) => {
                out = updated;
                true
            }
            None => false,
        };

        DescriptorRewrite {
            changed: out != text,
            text: out,
            rewritten_paths,
            warnings_added,
        }
    }

    /// Rebase every entry of a `;`-separated `Include` list, returning the
    /// new list and the number of entries that changed
    fn rebase_list(&self, value: &str, base: &RelPath, mv: &DescriptorMove) -> Option<(String, usize)> {
        let mut changed = 0;
        let entries: Vec<String> = value
            .split(';')
            .map(|entry| match self.rebase(entry, base, mv) {
                Some(rebased) => {
                    changed += 1;
                    rebased
                }
                None => entry.to_string(),
            })
            .collect();
        (changed > 0).then(|| (entries.join(";"), changed))
    }

    /// New value for one path field, or `None` to leave it untouched
    fn rebase(&self, value: &str, base: &RelPath, mv: &DescriptorMove) -> Option<String> {
        if !PathKind::classify(value).is_rewritable() {
            return None;
        }
        let trimmed = value.trim();
        let trailing = trimmed.ends_with(['/', '\\']);
        let target = base.join(trimmed);
        if target.escapes_root() {
            tracing::warn!(value = %trimmed, resolved = %target, "descriptor path resolves outside the workspace root");
        }

        let rendered = match self.options.strategy {
            RewriteStrategy::Relative => {
                let separator = Separator::detect(trimmed).unwrap_or(self.options.separator);
                let relative = match target.relative_from(&mv.to_dir) {
                    Ok(relative) => relative,
                    Err(e) => {
                        tracing::warn!(value = %trimmed, error = %e, "leaving descriptor path unchanged");
                        return None;
                    }
                };
                let mut rendered = relative.render(separator);
                if trailing {
                    rendered.push(separator.as_char());
                }
                rendered
            }
            RewriteStrategy::Absolute => {
                let mut rendered = target.to_native(&mv.root).display().to_string();
                if trailing {
                    rendered.push(std::path::MAIN_SEPARATOR);
                }
                rendered
            }
        };

        (rendered != value).then_some(rendered)
    }
}

fn marker_for(dir: &RelPath) -> String {
    format!("{MARKER_PREFIX}{dir}{MARKER_SUFFIX}")
}

/// Record `dir` as the descriptor's base, replacing an existing marker or
/// inserting one after the XML declaration
fn set_marker(text: &str, dir: &RelPath) -> String {
    let marker = marker_for(dir);
    if MARKER.is_match(text) {
        return MARKER.replace(text, regex::NoExpand(&marker)).into_owned();
    }

    let ending = LineEnding::detect(text).as_str();
    let body = text.trim_start_matches('\u{feff}');
    let bom_len = text.len() - body.len();
    if body.starts_with("<?xml") {
        let insert_at = match text.find(ending) {
            Some(pos) => pos + ending.len(),
            None => match text.find("?>") {
                Some(pos) => pos + 2,
                None => bom_len,
            },
        };
        let separator = if text[..insert_at].ends_with(ending) { "" } else { ending };
        format!("{}{separator}{marker}{ending}{}", &text[..insert_at], &text[insert_at..])
    } else {
        format!("{}{marker}{ending}{}", &text[..bom_len], &text[bom_len..])
    }
}
