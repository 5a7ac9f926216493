//! Offline driver: runs one generation cycle over files already on disk
//!
//! Plays the host's part for the `sublink relink` command. The root-level
//! solution goes through the solution callback, then every root-level
//! descriptor goes through the descriptor callback, and changed text is
//! written back in place.

use crate::error::{SublinkError, SublinkResult};
use crate::relinker::Relinker;
use crate::relocation::RelocationOutcome;
use std::fs;
use std::path::{Path, PathBuf};

/// Solution manifest extension
pub const SOLUTION_EXTENSION: &str = "sln";

/// Summary of one offline cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelinkReport {
    /// Solution processed, if any
    pub solution: Option<PathBuf>,
    /// Whether the solution text changed
    pub solution_changed: bool,
    /// Descriptors processed, with whether their text changed
    pub descriptors: Vec<(PathBuf, bool)>,
    /// Relocation outcomes of the cycle
    pub outcomes: Vec<RelocationOutcome>,
    /// Nothing was written
    pub dry_run: bool,
}

impl RelinkReport {
    /// Number of descriptors linked into a sub-project
    #[must_use]
    pub fn linked(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_linked()).count()
    }

    /// Number of relocations that were abandoned
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RelocationOutcome::Skipped { .. }))
            .count()
    }

    /// Human-readable summary
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();
        if self.dry_run {
            report.push_str("Dry run: no files written\n");
        }
        match &self.solution {
            Some(path) => report.push_str(&format!(
                "Solution: {} ({})\n",
                path.display(),
                if self.solution_changed { "rewritten" } else { "unchanged" }
            )),
            None => report.push_str("Solution: none found\n"),
        }
        let changed = self.descriptors.iter().filter(|(_, c)| *c).count();
        report.push_str(&format!(
            "Descriptors: {} ({} rewritten)\n",
            self.descriptors.len(),
            changed
        ));
        report.push_str(&format!("Linked: {}\n", self.linked()));
        report.push_str(&format!("Skipped: {}\n", self.skipped()));
        for outcome in &self.outcomes {
            report.push_str(&format!("  {outcome}\n"));
        }
        report
    }
}

/// Files directly under `root` with extension `ext` (case-insensitive), sorted
///
/// # Errors
/// Returns error if `root` cannot be listed
pub fn root_files(root: &Path, ext: &str) -> SublinkResult<Vec<PathBuf>> {
    let entries = fs::read_dir(root).map_err(|e| SublinkError::io_error(root, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SublinkError::io_error(root, e))?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run one cycle over the workspace of `relinker`
///
/// Without an explicit `solution`, the first root-level `.sln` is used.
///
/// # Errors
/// Returns error if a file cannot be read or written; relocation failures
/// are reported in the outcomes instead
pub fn relink_workspace(relinker: &mut Relinker, solution: Option<&Path>) -> SublinkResult<RelinkReport> {
    let root = relinker.root().to_path_buf();
    let dry_run = relinker.is_dry_run();
    let mut report = RelinkReport {
        dry_run,
        ..RelinkReport::default()
    };

    let solution = match solution {
        Some(path) if path.is_absolute() => Some(path.to_path_buf()),
        Some(path) => Some(root.join(path)),
        None => root_files(&root, SOLUTION_EXTENSION)?.into_iter().next(),
    };

    if let Some(path) = solution {
        let text = read(&path)?;
        let out = relinker.on_generated_solution(&path, &text);
        report.solution_changed = out != text;
        if report.solution_changed && !dry_run {
            write(&path, &out)?;
        }
        report.solution = Some(path);
    } else {
        tracing::info!(root = %root.display(), "no solution manifest found");
        relinker.begin_pass();
    }

    let extension = relinker.config().descriptor_extension.clone();
    for path in root_files(&root, &extension)? {
        let text = read(&path)?;
        let out = relinker.on_generated_project(&path, &text);
        let changed = out != text;
        if changed && !dry_run {
            write(&path, &out)?;
        }
        report.descriptors.push((path, changed));
    }

    report.outcomes = relinker.finish_pass();
    Ok(report)
}

fn read(path: &Path) -> SublinkResult<String> {
    fs::read_to_string(path).map_err(|e| SublinkError::io_error(path, e))
}

/// Overwrite in place so existing hard links observe the new content
fn write(path: &Path, content: &str) -> SublinkResult<()> {
    fs::write(path, content).map_err(|e| SublinkError::io_error(path, e))
}
