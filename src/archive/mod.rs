//! Archive collaborator interfaces
//!
//! The linker never talks to CASC/TACT directly. It needs four things from the
//! archive: content lookup, filename resolution, the per-kind type index, and
//! a way to correct a misdetected type. Hosts implement these traits over
//! whatever storage they already have; [`MemoryArchive`] covers embedding
//! and tests.

mod kind;
pub mod listfile;
pub mod memory;
pub mod types;

pub use kind::AssetKind;
pub use listfile::Listfile;
pub use memory::MemoryArchive;
pub use types::TypeMap;

use crate::graph::Fdid;

/// Errors raised by archive lookups
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// FDID has no content (or no filename) in this build
    #[error("file {0} not found in archive")]
    NotFound(Fdid),

    /// Content exists but could not be read
    #[error("failed to read file {fdid}: {message}")]
    Read { fdid: Fdid, message: String },
}

/// Resolves an FDID to raw bytes
pub trait ContentSource {
    fn exists(&self, fdid: Fdid) -> bool;

    fn open(&self, fdid: Fdid) -> Result<Vec<u8>, ArchiveError>;
}

/// Resolves an FDID to its listfile name
pub trait FilenameResolver {
    fn filename(&self, fdid: Fdid) -> Result<String, ArchiveError>;
}

/// Out-of-band type classification
pub trait TypeRegistry {
    /// FDIDs detected as `kind`, in ascending order.
    ///
    /// `None` means types were never detected for this kind, which is
    /// different from "detected, but no files".
    fn type_index(&self, kind: AssetKind) -> Option<Vec<Fdid>>;

    /// Re-tag a file after extraction discovered its real kind
    fn set_detected_kind(&self, fdid: Fdid, kind: AssetKind);
}

/// Everything the linker needs from an archive.
///
/// `Sync` because extraction fans out across the rayon pool.
pub trait Archive: ContentSource + FilenameResolver + TypeRegistry + Send + Sync {}

impl<T> Archive for T where T: ContentSource + FilenameResolver + TypeRegistry + Send + Sync {}
