//! sublink rewriting layer
//!
//! Pure text transformations over generated IDE artifacts, plus the reader
//! for per-sub-project ownership manifests.
//!
//! # Core Operations
//!
//! - **Ownership**: Read each sub-project's manifest into an [`OwnershipMap`]
//! - **Solution**: Parse project declarations, drop duplicate ids, point owned
//!   projects at their relocated descriptors
//! - **Descriptor**: Re-anchor relative paths inside a project descriptor and
//!   keep documentation warnings suppressed
//!
//! # Architecture
//!
//! ```text
//! sub-project manifests → ManifestReader → OwnershipMap
//!                                              ↓
//! solution text ─────────────────────→ SolutionRewriter → solution text'
//!                                              ↓ relocations
//! descriptor text ───────────────────→ DescriptorRewriter → descriptor text'
//! ```
//!
//! # Example
//!
//! ```rust
//! use sublink_model::{OwnershipMap, RelPath};
//! use sublink_rewrite::SolutionRewriter;
//!
//! let mut owners = OwnershipMap::new();
//! owners.claim("Core.Runtime", &RelPath::parse("libs/Core"));
//!
//! let text = "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Core.Runtime\", \"Core.Runtime.csproj\", \"{C1}\"\r\nEndProject\r\n";
//! let result = SolutionRewriter::new(&owners, "csproj").rewrite(text);
//! assert!(result.text.contains("libs/Core/Core.Runtime.csproj"));
//! ```
//!
//! [`OwnershipMap`]: sublink_model::OwnershipMap

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod descriptor;
pub mod error;
pub mod ownership;
pub mod solution;
pub mod text;
pub mod warnings;

pub use descriptor::{
    DescriptorMove, DescriptorOptions, DescriptorRewrite, DescriptorRewriter, RewriteStrategy,
};
pub use error::{RewriteError, RewriteResult};
pub use ownership::{ManifestReader, DEFAULT_MANIFEST_FILE_NAME};
pub use solution::{ProjectRelocation, SolutionRewrite, SolutionRewriter, SOLUTION_MARKER};
pub use text::LineEnding;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the rewriting layer
    pub use crate::descriptor::{DescriptorMove, DescriptorOptions, DescriptorRewriter, RewriteStrategy};
    pub use crate::ownership::ManifestReader;
    pub use crate::solution::{SolutionRewrite, SolutionRewriter};
    pub use sublink_model::{OwnershipMap, ProjectRecord, RelPath};
}
