//! Format reader interfaces
//!
//! Binary decoding lives outside this crate. A reader turns one file's bytes
//! into the reference-carrying record the extractors consume, or reports why
//! it could not.

pub mod memory;
pub mod records;

use std::sync::Arc;

use crate::graph::Fdid;

pub use memory::MemoryRecords;
pub use records::{
    AnimFileEntry, ContainerRecord, Material, ModelRecord, ObjectPlacement, TileEntry, TileRecord,
    WorldRecord,
};

/// Decoder failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Content is a known sibling sub-type (e.g. a WMO group read as a root)
    #[error("unsupported variant: {0}")]
    UnsupportedVariant(String),

    /// Content is not a valid file of this format
    #[error("malformed data: {0}")]
    Malformed(String),
}

pub trait ModelReader: Send + Sync {
    fn read_model(&self, fdid: Fdid, bytes: &[u8]) -> Result<ModelRecord, FormatError>;
}

pub trait ContainerReader: Send + Sync {
    fn read_container(&self, fdid: Fdid, bytes: &[u8]) -> Result<ContainerRecord, FormatError>;
}

pub trait WorldReader: Send + Sync {
    fn read_world(&self, fdid: Fdid, bytes: &[u8]) -> Result<WorldRecord, FormatError>;
}

/// Bytes of the split files that make up one terrain tile
#[derive(Debug, Clone, Default)]
pub struct TileFiles {
    pub root: Vec<u8>,
    pub obj0: Option<Vec<u8>>,
    pub tex0: Option<Vec<u8>>,
}

impl TileFiles {
    pub fn total_len(&self) -> usize {
        self.root.len()
            + self.obj0.as_ref().map_or(0, Vec::len)
            + self.tex0.as_ref().map_or(0, Vec::len)
    }
}

pub trait TileReader: Send + Sync {
    fn read_tile(&self, tile: &TileEntry, files: &TileFiles) -> Result<TileRecord, FormatError>;
}

/// One reader per asset kind
#[derive(Clone)]
pub struct Readers {
    pub model: Arc<dyn ModelReader>,
    pub container: Arc<dyn ContainerReader>,
    pub world: Arc<dyn WorldReader>,
    pub tile: Arc<dyn TileReader>,
}

impl Readers {
    pub fn new(
        model: Arc<dyn ModelReader>,
        container: Arc<dyn ContainerReader>,
        world: Arc<dyn WorldReader>,
        tile: Arc<dyn TileReader>,
    ) -> Self {
        Self {
            model,
            container,
            world,
            tile,
        }
    }

    /// Use a single value that reads every format
    pub fn shared<R>(reader: Arc<R>) -> Self
    where
        R: ModelReader + ContainerReader + WorldReader + TileReader + 'static,
    {
        Self {
            model: reader.clone(),
            container: reader.clone(),
            world: reader.clone(),
            tile: reader,
        }
    }
}
