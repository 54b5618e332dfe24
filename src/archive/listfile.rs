//! Listfile loading
//!
//! A listfile maps FDIDs to their client paths, one `fdid;path` record per
//! line. Paths are stored lowercased with forward slashes.

use ahash::AHashMap;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use super::{ArchiveError, FilenameResolver};
use crate::graph::Fdid;

#[derive(Debug, Clone, Default)]
pub struct Listfile {
    names: AHashMap<Fdid, String>,
}

impl Listfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open listfile {}", path.display()))?;
        Self::from_reader(file)
    }

    /// Parse `fdid;path` records.
    ///
    /// Blank lines and records whose id is not a number are ignored; listfiles
    /// in the wild carry comments and trailing garbage.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut listfile = Listfile::new();
        for record in csv_reader.records() {
            let record = record.context("Failed to read listfile record")?;
            let (Some(id), Some(name)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let Ok(fdid) = id.trim().parse::<Fdid>() else {
                continue;
            };
            listfile.insert(fdid, name.trim());
        }
        Ok(listfile)
    }

    pub fn insert(&mut self, fdid: Fdid, name: &str) {
        self.names
            .insert(fdid, name.replace('\\', "/").to_lowercase());
    }

    pub fn get(&self, fdid: Fdid) -> Option<&str> {
        self.names.get(&fdid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FilenameResolver for Listfile {
    fn filename(&self, fdid: Fdid) -> Result<String, ArchiveError> {
        self.get(fdid)
            .map(str::to_string)
            .ok_or(ArchiveError::NotFound(fdid))
    }
}
