//! Engine configuration
//!
//! Read from an optional `sublink.toml` at the workspace root:
//!
//! ```toml
//! manifest_file_name = ".sublink"
//! strategy = "relative"
//! suppressed_warnings = ["1573", "1591"]
//! subprojects = ["libs/Core", "libs/Net"]
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sublink_model::Separator;
use sublink_rewrite::descriptor::{
    DEFAULT_INCLUDE_ELEMENTS, DEFAULT_PATH_ELEMENTS, DEFAULT_SUPPRESSED_WARNINGS,
};
use sublink_rewrite::{DescriptorOptions, ManifestReader, RewriteStrategy, DEFAULT_MANIFEST_FILE_NAME};

/// Configuration file looked up at the workspace root
pub const CONFIG_FILE_NAME: &str = "sublink.toml";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SublinkConfig {
    /// Ownership manifest file name inside each sub-project
    pub manifest_file_name: String,
    /// Descriptor extension handled by the project callback
    pub descriptor_extension: String,
    /// Path rewrite strategy
    pub strategy: RewriteStrategy,
    /// Separator for rewritten values that had none
    pub separator: Separator,
    /// Warning codes kept in `<NoWarn>`
    pub suppressed_warnings: Vec<String>,
    /// Elements whose text is a path
    pub path_elements: Vec<String>,
    /// Elements whose `Include` attribute is a path
    pub include_elements: Vec<String>,
    /// Explicit sub-project directories, in ownership priority order;
    /// `.gitmodules` is read when absent
    pub subprojects: Option<Vec<PathBuf>>,
}

impl Default for SublinkConfig {
    fn default() -> Self {
        let options = DescriptorOptions::default();
        Self {
            manifest_file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
            descriptor_extension: "csproj".to_string(),
            strategy: options.strategy,
            separator: options.separator,
            suppressed_warnings: to_strings(DEFAULT_SUPPRESSED_WARNINGS),
            path_elements: to_strings(DEFAULT_PATH_ELEMENTS),
            include_elements: to_strings(DEFAULT_INCLUDE_ELEMENTS),
            subprojects: None,
        }
    }
}

fn to_strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl SublinkConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `sublink.toml` from `root`; a missing file yields defaults
    ///
    /// # Errors
    /// Returns error if the file exists but is unreadable or malformed
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)
                    .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
                tracing::debug!(config = %path.display(), "loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::io_error(path, e)),
        }
    }

    /// Parse configuration text
    ///
    /// # Errors
    /// Returns error on malformed TOML or unknown keys
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// With rewrite strategy
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: RewriteStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// With ownership manifest file name
    #[inline]
    #[must_use]
    pub fn with_manifest_file_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_file_name = name.into();
        self
    }

    /// With explicit sub-project directories
    #[inline]
    #[must_use]
    pub fn with_subprojects<P: Into<PathBuf>>(mut self, dirs: impl IntoIterator<Item = P>) -> Self {
        self.subprojects = Some(dirs.into_iter().map(Into::into).collect());
        self
    }

    /// With suppressed warning codes
    #[inline]
    #[must_use]
    pub fn with_suppressed_warnings<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.suppressed_warnings = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Descriptor rewriter settings
    #[must_use]
    pub fn descriptor_options(&self) -> DescriptorOptions {
        DescriptorOptions {
            strategy: self.strategy,
            path_elements: self.path_elements.clone(),
            include_elements: self.include_elements.clone(),
            suppressed_warnings: self.suppressed_warnings.clone(),
            separator: self.separator,
        }
    }

    /// Ownership manifest reader
    #[must_use]
    pub fn manifest_reader(&self) -> ManifestReader {
        ManifestReader::new(&self.manifest_file_name)
    }

    /// Check if `path` has the handled descriptor extension
    #[must_use]
    pub fn is_descriptor(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.descriptor_extension))
    }
}
