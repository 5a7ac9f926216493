//! Project records declared by a solution manifest

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Project identity as written in the solution (usually a braced GUID)
///
/// Equality and hashing ignore ASCII case; the original spelling is kept for
/// re-emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Wrap a raw id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id exactly as written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ProjectId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for ProjectId {}

impl Hash for ProjectId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_uppercase());
        }
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `Project(...) = ...` declaration
///
/// Immutable once parsed; identity is [`ProjectRecord::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Project type GUID
    pub group_id: String,
    /// Project name (descriptor file stem)
    pub name: String,
    /// Descriptor path as declared, relative to the solution
    pub declared_path: String,
    /// Project GUID
    pub id: ProjectId,
}

impl ProjectRecord {
    /// Create a new record
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        name: impl Into<String>,
        declared_path: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            name: name.into(),
            declared_path: declared_path.into(),
            id: ProjectId::new(id),
        }
    }

    /// Extension of the declared descriptor path, if any
    #[must_use]
    pub fn declared_extension(&self) -> Option<&str> {
        let file = self
            .declared_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.declared_path);
        file.rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}
