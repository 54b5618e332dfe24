//! Pre-decoded records
//!
//! A reader that ignores the bytes it is handed and returns whatever record
//! was registered for the FDID. Hosts that already decode assets elsewhere can
//! feed their results through it; the test suite uses it for every scenario.

use ahash::{AHashMap, AHashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    ContainerReader, ContainerRecord, FormatError, ModelReader, ModelRecord, TileEntry, TileFiles,
    TileReader, TileRecord, WorldReader, WorldRecord,
};
use crate::graph::Fdid;

#[derive(Debug, Default)]
pub struct MemoryRecords {
    models: AHashMap<Fdid, ModelRecord>,
    containers: AHashMap<Fdid, ContainerRecord>,
    worlds: AHashMap<Fdid, WorldRecord>,
    /// Keyed by the tile's root FDID
    tiles: AHashMap<Fdid, TileRecord>,
    groups: AHashSet<Fdid>,
    unsupported: AHashMap<Fdid, String>,
    malformed: AHashMap<Fdid, String>,
    decodes: AtomicUsize,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_model(&mut self, fdid: Fdid, record: ModelRecord) -> &mut Self {
        self.models.insert(fdid, record);
        self
    }

    pub fn add_container(&mut self, fdid: Fdid, record: ContainerRecord) -> &mut Self {
        self.containers.insert(fdid, record);
        self
    }

    pub fn add_world(&mut self, fdid: Fdid, record: WorldRecord) -> &mut Self {
        self.worlds.insert(fdid, record);
        self
    }

    pub fn add_tile(&mut self, root: Fdid, record: TileRecord) -> &mut Self {
        self.tiles.insert(root, record);
        self
    }

    /// Reading `fdid` as a root container reports it as a group file
    pub fn add_group(&mut self, fdid: Fdid) -> &mut Self {
        self.groups.insert(fdid);
        self
    }

    /// Any read of `fdid` fails as an unsupported variant
    pub fn add_unsupported(&mut self, fdid: Fdid, message: &str) -> &mut Self {
        self.unsupported.insert(fdid, message.to_string());
        self
    }

    /// Any read of `fdid` fails as malformed
    pub fn add_malformed(&mut self, fdid: Fdid, message: &str) -> &mut Self {
        self.malformed.insert(fdid, message.to_string());
        self
    }

    /// Number of read calls served so far, successful or not
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }

    fn lookup<T: Clone>(&self, map: &AHashMap<Fdid, T>, fdid: Fdid) -> Result<T, FormatError> {
        self.decodes.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = self.unsupported.get(&fdid) {
            return Err(FormatError::UnsupportedVariant(message.clone()));
        }
        if let Some(message) = self.malformed.get(&fdid) {
            return Err(FormatError::Malformed(message.clone()));
        }
        map.get(&fdid)
            .cloned()
            .ok_or_else(|| FormatError::Malformed(format!("no record registered for {}", fdid)))
    }
}

impl ModelReader for MemoryRecords {
    fn read_model(&self, fdid: Fdid, _bytes: &[u8]) -> Result<ModelRecord, FormatError> {
        self.lookup(&self.models, fdid)
    }
}

impl ContainerReader for MemoryRecords {
    fn read_container(&self, fdid: Fdid, _bytes: &[u8]) -> Result<ContainerRecord, FormatError> {
        if self.groups.contains(&fdid) {
            self.decodes.fetch_add(1, Ordering::Relaxed);
            return Err(FormatError::UnsupportedVariant(format!(
                "{} is a group WMO",
                fdid
            )));
        }
        self.lookup(&self.containers, fdid)
    }
}

impl WorldReader for MemoryRecords {
    fn read_world(&self, fdid: Fdid, _bytes: &[u8]) -> Result<WorldRecord, FormatError> {
        self.lookup(&self.worlds, fdid)
    }
}

impl TileReader for MemoryRecords {
    fn read_tile(&self, tile: &TileEntry, _files: &TileFiles) -> Result<TileRecord, FormatError> {
        self.lookup(&self.tiles, tile.root_adt)
    }
}
