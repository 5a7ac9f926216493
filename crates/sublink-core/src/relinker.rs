//! Host callback entry points
//!
//! A generation cycle is one solution callback followed by any number of
//! descriptor callbacks. Ownership is computed once per cycle and threaded
//! through a [`GenerationPass`]; nothing survives [`Relinker::finish_pass`].
//!
//! A pass started by the solution callback is fixed for the rest of its
//! cycle. A pass started lazily by a descriptor callback has no cycle
//! boundary, so every later descriptor callback rereads sub-project
//! discovery and stats each manifest to check it is still current.
//!
//! Neither callback fails. Errors are logged and the host gets usable text
//! back: the solution unchanged, or the descriptor without relocation.

use crate::config::SublinkConfig;
use crate::discovery::{GitModules, StaticSubprojects, SubprojectSource};
use crate::error::{DiscoveryError, SublinkError, SublinkResult};
use crate::relocation::{Linker, RelocationExecutor, RelocationOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use sublink_model::{OwnershipMap, RelPath};
use sublink_rewrite::{warnings, DescriptorMove, DescriptorRewriter, ManifestReader, SolutionRewriter};

/// Ownership state for one generation cycle
#[derive(Debug, Clone)]
pub struct GenerationPass {
    owners: OwnershipMap,
    subprojects: Vec<RelPath>,
    fingerprints: Vec<(PathBuf, Option<SystemTime>)>,
}

impl GenerationPass {
    /// Discover sub-projects and read their ownership manifests
    ///
    /// # Errors
    /// Returns error if sub-project discovery fails
    pub fn build(
        root: &Path,
        source: &dyn SubprojectSource,
        reader: &ManifestReader,
    ) -> Result<Self, DiscoveryError> {
        let subprojects = source.subprojects(root)?;
        let owners = reader.build_map(root, &subprojects);
        let fingerprints = fingerprints(root, &subprojects, reader);
        Ok(Self {
            owners,
            subprojects,
            fingerprints,
        })
    }

    /// Pass with no sub-projects; nothing is owned
    #[must_use]
    pub fn empty() -> Self {
        Self {
            owners: OwnershipMap::new(),
            subprojects: Vec::new(),
            fingerprints: Vec::new(),
        }
    }

    /// Resolved ownership
    #[inline]
    #[must_use]
    pub fn owners(&self) -> &OwnershipMap {
        &self.owners
    }

    /// Sub-projects in priority order
    #[inline]
    #[must_use]
    pub fn subprojects(&self) -> &[RelPath] {
        &self.subprojects
    }

    /// Check if discovery or any manifest changed since the pass was built
    #[must_use]
    pub fn is_stale(&self, root: &Path, source: &dyn SubprojectSource, reader: &ManifestReader) -> bool {
        match source.subprojects(root) {
            Ok(current) if current == self.subprojects => {
                fingerprints(root, &current, reader) != self.fingerprints
            }
            _ => true,
        }
    }
}

fn fingerprints(
    root: &Path,
    subprojects: &[RelPath],
    reader: &ManifestReader,
) -> Vec<(PathBuf, Option<SystemTime>)> {
    subprojects
        .iter()
        .map(|dir| {
            let path = reader.manifest_path(&dir.to_native(root));
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
            (path, modified)
        })
        .collect()
}

/// Engine behind the two host callbacks
#[derive(Debug)]
pub struct Relinker {
    root: PathBuf,
    config: SublinkConfig,
    reader: ManifestReader,
    source: Box<dyn SubprojectSource>,
    executor: RelocationExecutor,
    descriptor_rewriter: DescriptorRewriter,
    dry_run: bool,
    pass: Option<GenerationPass>,
    pass_pinned: bool,
    outcomes: Vec<RelocationOutcome>,
}

impl Relinker {
    /// Create engine for the workspace at `root`
    ///
    /// Sub-projects come from `config.subprojects` when set, otherwise from
    /// `.gitmodules`.
    ///
    /// # Errors
    /// Returns error if the configured element names are invalid or `root`
    /// cannot be made absolute
    pub fn new(root: impl Into<PathBuf>, config: SublinkConfig) -> SublinkResult<Self> {
        let root = absolute(root.into())?;
        let descriptor_rewriter = DescriptorRewriter::new(config.descriptor_options())?;
        let source: Box<dyn SubprojectSource> = match &config.subprojects {
            Some(dirs) => Box::new(StaticSubprojects::new(dirs.iter().cloned())),
            None => Box::new(GitModules),
        };
        Ok(Self {
            reader: config.manifest_reader(),
            root,
            config,
            source,
            executor: RelocationExecutor::default(),
            descriptor_rewriter,
            dry_run: false,
            pass: None,
            pass_pinned: false,
            outcomes: Vec::new(),
        })
    }

    /// With sub-project source
    #[must_use]
    pub fn with_source(mut self, source: Box<dyn SubprojectSource>) -> Self {
        self.source = source;
        self.pass = None;
        self
    }

    /// With linker used for relocation
    #[must_use]
    pub fn with_linker(mut self, linker: Box<dyn Linker>) -> Self {
        self.executor = RelocationExecutor::new(linker);
        self
    }

    /// With dry run: rewrite text but leave the filesystem alone
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check if filesystem side effects are suppressed
    #[inline]
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Workspace root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SublinkConfig {
        &self.config
    }

    /// Start a fresh generation cycle, discarding any previous one
    pub fn begin_pass(&mut self) -> &GenerationPass {
        self.outcomes.clear();
        self.pass_pinned = false;
        self.rebuild_pass()
    }

    /// Current cycle, starting one if none is active
    ///
    /// A lazily started pass that went stale is rebuilt in place; outcomes
    /// recorded so far are kept. A pass started by the solution callback is
    /// used as is until the next one.
    pub fn current_pass(&mut self) -> &GenerationPass {
        let stale = self.pass.as_ref().map(|pass| {
            !self.pass_pinned && pass.is_stale(&self.root, self.source.as_ref(), &self.reader)
        });
        match stale {
            None => self.begin_pass(),
            Some(true) => {
                tracing::debug!("ownership manifests changed; rebuilding pass");
                self.rebuild_pass()
            }
            Some(false) => &*self.pass.get_or_insert_with(GenerationPass::empty),
        }
    }

    fn rebuild_pass(&mut self) -> &GenerationPass {
        let pass = match GenerationPass::build(&self.root, self.source.as_ref(), &self.reader) {
            Ok(pass) => pass,
            Err(e) => {
                tracing::warn!(error = %e, "sub-project discovery failed; nothing will be relocated");
                GenerationPass::empty()
            }
        };
        tracing::debug!(
            subprojects = pass.subprojects().len(),
            owned = pass.owners().len(),
            "built generation pass"
        );
        self.pass.insert(pass)
    }

    /// End the current cycle and hand back its relocation outcomes
    pub fn finish_pass(&mut self) -> Vec<RelocationOutcome> {
        self.pass = None;
        self.pass_pinned = false;
        std::mem::take(&mut self.outcomes)
    }

    /// Relocation outcomes recorded so far in the current cycle
    #[inline]
    #[must_use]
    pub fn outcomes(&self) -> &[RelocationOutcome] {
        &self.outcomes
    }

    /// Solution callback: rewrite the manifest about to be saved at `path`
    ///
    /// Always starts a fresh cycle.
    pub fn on_generated_solution(&mut self, path: &Path, content: &str) -> String {
        let extension = self.config.descriptor_extension.clone();
        self.begin_pass();
        self.pass_pinned = true;
        let pass = self.current_pass();
        let rewrite = SolutionRewriter::new(pass.owners(), extension).rewrite(content);
        for duplicate in &rewrite.duplicates {
            tracing::info!(project = %duplicate.name, id = %duplicate.id, "dropped duplicate project declaration");
        }
        tracing::info!(
            solution = %path.display(),
            projects = rewrite.records.len(),
            relocated = rewrite.relocations.len(),
            "rewrote solution"
        );
        rewrite.text
    }

    /// Descriptor callback: rewrite the descriptor about to be saved at `path`
    /// and relocate it into its owning sub-project
    pub fn on_generated_project(&mut self, path: &Path, content: &str) -> String {
        if !self.config.is_descriptor(path) {
            return content.to_string();
        }
        let original = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let Ok(relative) = RelPath::within(&self.root, &original) else {
            tracing::warn!(descriptor = %original.display(), "descriptor outside workspace root; not relocating");
            return self.suppress_warnings(content);
        };
        let from_dir = relative.parent().unwrap_or_default();
        let name = original
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file_name = original
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root = self.root.clone();
        let pass = self.current_pass();
        let owner = pass.owners().owner_of(&name).cloned();
        let candidates: Vec<PathBuf> = pass
            .subprojects()
            .iter()
            .map(|dir| dir.join(&file_name).to_native(&root))
            .collect();
        let unrelocated = DescriptorMove::new(&self.root, from_dir.clone(), from_dir.clone());

        let Some(owner) = owner.filter(|o| !o.is_root() && *o != from_dir) else {
            tracing::debug!(project = %name, "descriptor not owned by a sub-project");
            if !self.dry_run {
                self.executor.prune(&original, &candidates, None);
            }
            return self.descriptor_rewriter.rewrite(content, &unrelocated).text;
        };

        let target = owner.join(&file_name).to_native(&self.root);
        let relocated = self
            .descriptor_rewriter
            .rewrite(content, &DescriptorMove::new(&self.root, from_dir, owner));

        if self.dry_run {
            self.outcomes.push(RelocationOutcome::Planned { original, target });
            return relocated.text;
        }

        let outcome = self.executor.relocate(&original, &target, &relocated.text);
        let linked = outcome.is_linked();
        self.outcomes.push(outcome);
        self.executor
            .prune(&original, &candidates, linked.then_some(target.as_path()));
        if linked {
            relocated.text
        } else {
            self.descriptor_rewriter.rewrite(content, &unrelocated).text
        }
    }

    fn suppress_warnings(&self, content: &str) -> String {
        warnings::ensure_suppressed(content, &self.descriptor_rewriter.options().suppressed_warnings)
            .unwrap_or_else(|| content.to_string())
    }
}

fn absolute(root: PathBuf) -> SublinkResult<PathBuf> {
    if root.is_absolute() {
        return Ok(root);
    }
    let cwd = std::env::current_dir().map_err(|e| SublinkError::io_error(&root, e))?;
    Ok(cwd.join(root))
}
