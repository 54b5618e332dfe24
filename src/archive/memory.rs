//! In-memory archive
//!
//! Content, listfile and type index held in process memory. Used to embed the
//! linker over already-extracted data and throughout the test suite.

use ahash::AHashMap;

use super::{
    ArchiveError, AssetKind, ContentSource, FilenameResolver, Listfile, TypeMap, TypeRegistry,
};
use crate::graph::Fdid;

#[derive(Debug, Default)]
pub struct MemoryArchive {
    files: AHashMap<Fdid, Vec<u8>>,
    listfile: Listfile,
    types: TypeMap,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add file content without a name or type
    pub fn insert_file(&mut self, fdid: Fdid, bytes: Vec<u8>) {
        self.files.insert(fdid, bytes);
    }

    /// Add a classified, named file in one call
    pub fn add(&mut self, fdid: Fdid, name: &str, kind: AssetKind, bytes: Vec<u8>) {
        self.insert_file(fdid, bytes);
        self.listfile.insert(fdid, name);
        self.types.set(fdid, kind);
    }

    pub fn set_filename(&mut self, fdid: Fdid, name: &str) {
        self.listfile.insert(fdid, name);
    }

    pub fn classify(&self, fdid: Fdid, kind: AssetKind) {
        self.types.set(fdid, kind);
    }

    pub fn with_listfile(mut self, listfile: Listfile) -> Self {
        self.listfile = listfile;
        self
    }

    pub fn with_types(mut self, types: TypeMap) -> Self {
        self.types = types;
        self
    }

    pub fn types(&self) -> &TypeMap {
        &self.types
    }
}

impl ContentSource for MemoryArchive {
    fn exists(&self, fdid: Fdid) -> bool {
        self.files.contains_key(&fdid)
    }

    fn open(&self, fdid: Fdid) -> Result<Vec<u8>, ArchiveError> {
        self.files
            .get(&fdid)
            .cloned()
            .ok_or(ArchiveError::NotFound(fdid))
    }
}

impl FilenameResolver for MemoryArchive {
    fn filename(&self, fdid: Fdid) -> Result<String, ArchiveError> {
        self.listfile.filename(fdid)
    }
}

impl TypeRegistry for MemoryArchive {
    fn type_index(&self, kind: AssetKind) -> Option<Vec<Fdid>> {
        self.types.type_index(kind)
    }

    fn set_detected_kind(&self, fdid: Fdid, kind: AssetKind) {
        self.types.set_detected_kind(fdid, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_makes_file_visible_everywhere() {
        let mut archive = MemoryArchive::new();
        archive.add(775971, "world/maps/azeroth/azeroth.wdt", AssetKind::WorldDefinition, vec![1, 2]);

        assert!(archive.exists(775971));
        assert_eq!(archive.open(775971).unwrap(), vec![1, 2]);
        assert_eq!(archive.filename(775971).unwrap(), "world/maps/azeroth/azeroth.wdt");
        assert_eq!(
            archive.type_index(AssetKind::WorldDefinition),
            Some(vec![775971])
        );
    }

    #[test]
    fn test_missing_file() {
        let archive = MemoryArchive::new();
        assert!(!archive.exists(1));
        assert!(matches!(archive.open(1), Err(ArchiveError::NotFound(1))));
    }
}
