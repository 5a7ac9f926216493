//! Solution manifest parser and rewriter
//!
//! Project declarations are two-line blocks:
//!
//! ```text
//! Project("{FAE04EC0-...}") = "Core.Runtime", "Core.Runtime.csproj", "{1A2B...}"
//! EndProject
//! ```
//!
//! Matching blocks are lifted out, deduplicated by id and re-emitted at their
//! original position with a relocated descriptor path. Every other line passes
//! through untouched.

use crate::text::LineEnding;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use sublink_model::{OwnershipMap, ProjectId, ProjectRecord, RelPath};

/// Comment line identifying a rewritten solution
pub const SOLUTION_MARKER: &str = "# Project descriptors relocated into owning sub-projects by sublink";

const SOLUTION_HEADER: &str = "Microsoft Visual Studio Solution File";
const END_PROJECT: &str = "EndProject";

static PROJECT_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*Project\("(?P<group>[^"]*)"\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"(?P<id>[^"]*)"\s*$"#,
    )
    .expect("project declaration pattern must compile")
});

/// A retained project whose descriptor moves into a sub-project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRelocation {
    /// The declaring record
    pub record: ProjectRecord,
    /// Owning sub-project directory
    pub owner: RelPath,
    /// New descriptor path, relative to the solution
    pub descriptor_path: String,
}

/// Result of rewriting one solution manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionRewrite {
    /// Rewritten manifest text
    pub text: String,
    /// Retained records in first-seen order
    pub records: Vec<ProjectRecord>,
    /// Records dropped because their id was already declared
    pub duplicates: Vec<ProjectRecord>,
    /// Retained records relocated into a sub-project
    pub relocations: Vec<ProjectRelocation>,
}

impl SolutionRewrite {
    /// Check if the rewrite produced different text
    #[must_use]
    pub fn changed_from(&self, original: &str) -> bool {
        self.text != original
    }
}

enum Item<'a> {
    Line(&'a str),
    Project(ProjectRecord),
}

/// Parse a declaration line into a record
#[must_use]
pub fn parse_declaration(line: &str) -> Option<ProjectRecord> {
    let caps = PROJECT_DECLARATION.captures(line)?;
    Some(ProjectRecord::new(
        &caps["group"],
        &caps["name"],
        &caps["path"],
        &caps["id"],
    ))
}

/// Render a record as a declaration line with `path` as its descriptor path
#[must_use]
pub fn render_declaration(record: &ProjectRecord, path: &str) -> String {
    format!(
        "Project(\"{}\") = \"{}\", \"{}\", \"{}\"",
        record.group_id, record.name, path, record.id
    )
}

/// Every declaration block in scan order, duplicates included
#[must_use]
pub fn parse_records(text: &str) -> Vec<ProjectRecord> {
    let lines: Vec<&str> = LineEnding::detect(text).split(text).collect();
    let mut records = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        match declaration_block(&lines, i) {
            Some(record) => {
                records.push(record);
                i += 2;
            }
            None => i += 1,
        }
    }
    records
}

fn declaration_block(lines: &[&str], i: usize) -> Option<ProjectRecord> {
    let terminator = lines.get(i + 1)?;
    if terminator.trim() != END_PROJECT {
        return None;
    }
    parse_declaration(lines[i])
}

/// Rewrites solution manifests against an ownership map
#[derive(Debug, Clone)]
pub struct SolutionRewriter<'a> {
    owners: &'a OwnershipMap,
    default_extension: String,
}

impl<'a> SolutionRewriter<'a> {
    /// Create rewriter; `default_extension` is used for records whose
    /// declared path carries no extension
    #[must_use]
    pub fn new(owners: &'a OwnershipMap, default_extension: impl Into<String>) -> Self {
        Self {
            owners,
            default_extension: default_extension.into(),
        }
    }

    /// Descriptor path for `record` after relocation
    ///
    /// Owned records move to `<owner>/<name>.<ext>`. Unowned records that
    /// follow the `<name>.<ext>` convention (possibly under an old owner
    /// directory) return to `<name>.<ext>`; anything else keeps its declared
    /// path.
    #[must_use]
    pub fn descriptor_path(&self, record: &ProjectRecord) -> (String, Option<&'a RelPath>) {
        let ext = record
            .declared_extension()
            .unwrap_or(self.default_extension.as_str());
        let file_name = format!("{}.{}", record.name, ext);

        match self.owners.owner_of(&record.name) {
            Some(owner) if !owner.is_root() => (format!("{owner}/{file_name}"), Some(owner)),
            _ => {
                let declared = RelPath::parse(&record.declared_path);
                let conventional = declared
                    .file_name()
                    .is_some_and(|f| f.eq_ignore_ascii_case(&file_name));
                if conventional {
                    (file_name, None)
                } else {
                    (record.declared_path.clone(), None)
                }
            }
        }
    }

    /// Rewrite a full manifest
    ///
    /// Never fails: text without any declaration comes back unchanged apart
    /// from the marker comment.
    #[must_use]
    pub fn rewrite(&self, text: &str) -> SolutionRewrite {
        let (bom, text) = match text.strip_prefix('\u{feff}') {
            Some(rest) => ("\u{feff}", rest),
            None => ("", text),
        };
        let ending = LineEnding::detect(text);
        let lines: Vec<&str> = ending.split(text).collect();

        let mut items = Vec::with_capacity(lines.len());
        let mut seen: HashSet<ProjectId> = HashSet::new();
        let mut records = Vec::new();
        let mut duplicates = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            if let Some(record) = declaration_block(&lines, i) {
                i += 2;
                if seen.insert(record.id.clone()) {
                    records.push(record.clone());
                    items.push(Item::Project(record));
                } else {
                    tracing::debug!(project = %record.name, id = %record.id, "dropping duplicate project declaration");
                    duplicates.push(record);
                }
                continue;
            }
            if lines[i].trim() != SOLUTION_MARKER {
                items.push(Item::Line(lines[i]));
            }
            i += 1;
        }

        let marker_at = items
            .iter()
            .position(|item| matches!(item, Item::Line(line) if line.trim_start().starts_with(SOLUTION_HEADER)))
            .map_or(0, |pos| pos + 1);

        let mut out: Vec<String> = Vec::with_capacity(items.len() + records.len() + 1);
        let mut relocations = Vec::new();
        let mut marker_written = false;
        for (idx, item) in items.into_iter().enumerate() {
            if idx == marker_at {
                out.push(SOLUTION_MARKER.to_string());
                marker_written = true;
            }
            match item {
                Item::Line(line) => out.push(line.to_string()),
                Item::Project(record) => {
                    let (path, owner) = self.descriptor_path(&record);
                    out.push(render_declaration(&record, &path));
                    out.push(END_PROJECT.to_string());
                    if let Some(owner) = owner {
                        tracing::debug!(project = %record.name, path = %path, "relocating project descriptor");
                        relocations.push(ProjectRelocation {
                            record,
                            owner: owner.clone(),
                            descriptor_path: path,
                        });
                    }
                }
            }
        }
        if !marker_written {
            out.push(SOLUTION_MARKER.to_string());
        }

        SolutionRewrite {
            text: format!("{bom}{}", ending.join(&out)),
            records,
            duplicates,
            relocations,
        }
    }
}
