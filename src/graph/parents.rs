//! Existing-parent index
//!
//! In-memory set of every FDID the store already holds as a parent. Loaded once
//! when the linker starts and kept in step with each committed batch.

use ahash::AHashSet;
use std::sync::RwLock;

use super::schema::Fdid;

/// Thread-safe set of already linked parents.
///
/// Readers (extractors running on the rayon pool) only take the read lock;
/// inserts happen on the writer thread after a batch commits.
#[derive(Debug, Default)]
pub struct ParentIndex {
    parents: RwLock<AHashSet<Fdid>>,
}

impl ParentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_set(parents: AHashSet<Fdid>) -> Self {
        Self {
            parents: RwLock::new(parents),
        }
    }

    pub fn contains(&self, fdid: Fdid) -> bool {
        self.parents
            .read()
            .map(|set| set.contains(&fdid))
            .unwrap_or_else(|poisoned| poisoned.into_inner().contains(&fdid))
    }

    /// Returns true if the parent was not yet present
    pub fn insert(&self, fdid: Fdid) -> bool {
        match self.parents.write() {
            Ok(mut set) => set.insert(fdid),
            Err(poisoned) => poisoned.into_inner().insert(fdid),
        }
    }

    pub fn extend<I: IntoIterator<Item = Fdid>>(&self, fdids: I) {
        match self.parents.write() {
            Ok(mut set) => set.extend(fdids),
            Err(poisoned) => poisoned.into_inner().extend(fdids),
        }
    }

    /// Returns true if the parent was present
    pub fn remove(&self, fdid: Fdid) -> bool {
        match self.parents.write() {
            Ok(mut set) => set.remove(&fdid),
            Err(poisoned) => poisoned.into_inner().remove(&fdid),
        }
    }

    pub fn len(&self) -> usize {
        self.parents
            .read()
            .map(|set| set.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
