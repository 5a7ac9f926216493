//! sublink engine
//!
//! Keeps IDE project descriptors generated at a workspace root usable from
//! inside the sub-projects (e.g. git submodules) that own them.
//!
//! # Core Concepts
//!
//! - **Ownership manifest**: A `.sublink` file in a sub-project listing the
//!   project names it owns, one per line
//! - **Generation pass**: Ownership resolved once per generation cycle
//! - **Relocation**: A hard link inside the owning sub-project pointing at the
//!   root-level descriptor
//!
//! # Architecture
//!
//! ```text
//! host IDE generator
//!     │ solution text               │ descriptor text
//!     ▼                             ▼
//! Relinker::on_generated_solution   Relinker::on_generated_project
//!     │                             │
//!     ├─ SubprojectSource ──→ GenerationPass (OwnershipMap)
//!     │                             │
//!     ▼                             ├─ DescriptorRewriter
//! SolutionRewriter                  └─ RelocationExecutor ──→ Linker
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use sublink_core::{Relinker, SublinkConfig};
//!
//! # fn example(solution: &str, descriptor: &str) -> sublink_core::SublinkResult<()> {
//! let root = Path::new("/work/game");
//! let mut relinker = Relinker::new(root, SublinkConfig::load(root)?)?;
//!
//! let solution = relinker.on_generated_solution(&root.join("Game.sln"), solution);
//! let descriptor = relinker.on_generated_project(&root.join("Core.Runtime.csproj"), descriptor);
//!
//! for outcome in relinker.finish_pass() {
//!     println!("{outcome}");
//! }
//! # let _ = (solution, descriptor);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod relinker;
pub mod relocation;
pub mod workspace;

pub use config::{SublinkConfig, CONFIG_FILE_NAME};
pub use discovery::{GitModules, StaticSubprojects, SubprojectSource, GITMODULES_FILE_NAME};
pub use error::{ConfigError, DiscoveryError, RelocationError, SublinkError, SublinkResult};
pub use relinker::{GenerationPass, Relinker};
pub use relocation::{HardLinker, Linker, RelocationExecutor, RelocationOutcome};
pub use workspace::{relink_workspace, RelinkReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the sublink engine
    pub use crate::{
        GenerationPass, Linker, RelinkReport, RelocationOutcome, Relinker, SubprojectSource,
        SublinkConfig, SublinkError, SublinkResult,
    };
    pub use sublink_rewrite::RewriteStrategy;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
