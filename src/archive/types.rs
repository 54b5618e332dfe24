//! In-memory type index
//!
//! Holds the result of type detection: which FDIDs are models, WMOs, WDTs...
//! Kinds that were never detected have no entry at all, so callers can tell
//! "not classified" from "classified, empty".

use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use super::{AssetKind, TypeRegistry};
use crate::graph::Fdid;

#[derive(Debug, Default)]
pub struct TypeMap {
    inner: RwLock<TypeMapInner>,
}

#[derive(Debug, Default)]
struct TypeMapInner {
    by_kind: BTreeMap<AssetKind, BTreeSet<Fdid>>,
    by_fdid: AHashMap<Fdid, AssetKind>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` as classified even if no file of that kind exists
    pub fn declare(&self, kind: AssetKind) {
        self.write(|inner| {
            inner.by_kind.entry(kind).or_default();
        });
    }

    /// Classify `fdid`, moving it out of any previous kind
    pub fn set(&self, fdid: Fdid, kind: AssetKind) {
        self.write(|inner| {
            if let Some(previous) = inner.by_fdid.insert(fdid, kind) {
                if let Some(set) = inner.by_kind.get_mut(&previous) {
                    set.remove(&fdid);
                }
            }
            inner.by_kind.entry(kind).or_default().insert(fdid);
        });
    }

    pub fn kind_of(&self, fdid: Fdid) -> Option<AssetKind> {
        self.read(|inner| inner.by_fdid.get(&fdid).copied())
    }

    pub fn count(&self, kind: AssetKind) -> usize {
        self.read(|inner| inner.by_kind.get(&kind).map_or(0, BTreeSet::len))
    }

    /// Serialize as `{ "model": [..], "model_container": [..] }`
    pub fn to_json(&self) -> serde_json::Result<String> {
        self.read(|inner| serde_json::to_string(&inner.by_kind))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let by_kind: BTreeMap<AssetKind, BTreeSet<Fdid>> = serde_json::from_str(json)?;
        let by_fdid = by_kind
            .iter()
            .flat_map(|(kind, ids)| ids.iter().map(move |id| (*id, *kind)))
            .collect();
        Ok(Self {
            inner: RwLock::new(TypeMapInner { by_kind, by_fdid }),
        })
    }

    fn read<R>(&self, f: impl FnOnce(&TypeMapInner) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<R>(&self, f: impl FnOnce(&mut TypeMapInner) -> R) -> R {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl TypeRegistry for TypeMap {
    fn type_index(&self, kind: AssetKind) -> Option<Vec<Fdid>> {
        self.read(|inner| {
            inner
                .by_kind
                .get(&kind)
                .map(|ids| ids.iter().copied().collect())
        })
    }

    fn set_detected_kind(&self, fdid: Fdid, kind: AssetKind) {
        self.set(fdid, kind);
    }
}
