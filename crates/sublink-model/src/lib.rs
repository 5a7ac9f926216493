//! sublink data model
//!
//! Plain types shared by the rewriting and relocation layers.
//!
//! # Core Concepts
//!
//! - [`ProjectRecord`]: One project declared by a solution manifest
//! - [`ProjectId`]: Case-insensitive project identity
//! - [`OwnershipMap`]: Which sub-project directory owns which project name
//! - [`RelPath`]: Lexically normalized workspace-relative path
//!
//! # Example
//!
//! ```rust
//! use sublink_model::{OwnershipMap, RelPath, Separator};
//!
//! let mut owners = OwnershipMap::new();
//! owners.claim("Core.Runtime", &RelPath::parse("libs/Core"));
//!
//! let dir = owners.owner_of("core.runtime").unwrap();
//! let hint = RelPath::parse(r"libs\Foo.dll").relative_from(dir).unwrap();
//! assert_eq!(hint.render(Separator::Backslash), r"..\Foo.dll");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod ownership;
mod path;
mod record;

pub use ownership::{Claim, OwnershipConflict, OwnershipMap};
pub use path::{PathError, PathKind, RelPath, Separator};
pub use record::{ProjectId, ProjectRecord};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
