//! Project name → owning sub-project directory
//!
//! Built once per generation pass. Names compare case-insensitively; the first
//! sub-project to claim a name keeps it and later claims are recorded as
//! [`OwnershipConflict`]s instead of overriding.

use crate::path::RelPath;
use indexmap::IndexMap;

/// Outcome of [`OwnershipMap::claim`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// Name was unowned and now belongs to the claimant
    Claimed,
    /// Claimant is the existing owner (repeated claim)
    Unchanged,
    /// Another sub-project already owns the name
    Conflict(RelPath),
}

/// A name claimed by more than one sub-project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipConflict {
    /// Project name as written by the losing claimant
    pub name: String,
    /// Directory that keeps ownership
    pub owner: RelPath,
    /// Directory whose claim was ignored
    pub ignored: RelPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    directory: RelPath,
}

/// Mapping from project name to owning sub-project directory
#[derive(Debug, Clone, Default)]
pub struct OwnershipMap {
    entries: IndexMap<String, Entry>,
    conflicts: Vec<OwnershipConflict>,
}

impl OwnershipMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for `directory`; the first claim wins
    pub fn claim(&mut self, name: &str, directory: &RelPath) -> Claim {
        let key = name.to_lowercase();
        match self.entries.get(&key) {
            Some(entry) if entry.directory == *directory => Claim::Unchanged,
            Some(entry) => {
                let owner = entry.directory.clone();
                self.conflicts.push(OwnershipConflict {
                    name: name.to_string(),
                    owner: owner.clone(),
                    ignored: directory.clone(),
                });
                Claim::Conflict(owner)
            }
            None => {
                self.entries.insert(
                    key,
                    Entry {
                        name: name.to_string(),
                        directory: directory.clone(),
                    },
                );
                Claim::Claimed
            }
        }
    }

    /// Owning directory of `name`, if any
    #[must_use]
    pub fn owner_of(&self, name: &str) -> Option<&RelPath> {
        self.entries
            .get(&name.to_lowercase())
            .map(|entry| &entry.directory)
    }

    /// Number of owned names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is owned
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, directory)` pairs in claim order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelPath)> {
        self.entries
            .values()
            .map(|entry| (entry.name.as_str(), &entry.directory))
    }

    /// Claims that lost to an earlier owner
    #[inline]
    #[must_use]
    pub fn conflicts(&self) -> &[OwnershipConflict] {
        &self.conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_claim_wins() {
        let mut map = OwnershipMap::new();
        let core = RelPath::parse("libs/Core");
        let other = RelPath::parse("libs/Other");

        assert_eq!(map.claim("Core.Runtime", &core), Claim::Claimed);
        assert_eq!(map.claim("core.runtime", &other), Claim::Conflict(core.clone()));
        assert_eq!(map.owner_of("CORE.RUNTIME"), Some(&core));
        assert_eq!(map.conflicts().len(), 1);
        assert_eq!(map.conflicts()[0].ignored, other);
    }

    #[test]
    fn repeated_claim_is_unchanged() {
        let mut map = OwnershipMap::new();
        let core = RelPath::parse("libs/Core");
        map.claim("A", &core);
        assert_eq!(map.claim("A", &core), Claim::Unchanged);
        assert!(map.conflicts().is_empty());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn iter_keeps_claim_order_and_spelling() {
        let mut map = OwnershipMap::new();
        map.claim("Zeta", &RelPath::parse("z"));
        map.claim("Alpha", &RelPath::parse("a"));
        let names: Vec<_> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn unknown_name_is_unowned() {
        let map = OwnershipMap::new();
        assert!(map.is_empty());
        assert!(map.owner_of("Anything").is_none());
    }
}
