//! Per-entity link errors

use crate::archive::{ArchiveError, AssetKind};
use crate::diagnostics::{DiagnosticStage, LinkDiagnostic};
use crate::error_codes::*;
use crate::graph::Fdid;

/// Why a single entity could not be linked.
///
/// None of these stop a run. The orchestrator turns each into a
/// [`LinkDiagnostic`] and moves on to the next FDID.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("file {0} not found in archive")]
    NotFound(Fdid),

    /// Only the container pass can correct these by re-tagging
    #[error("{kind} {fdid} is an unsupported variant: {message}")]
    UnsupportedVariant {
        fdid: Fdid,
        kind: AssetKind,
        message: String,
    },

    #[error("failed to decode {kind} {fdid} ({len} bytes): {message}")]
    Decode {
        fdid: Fdid,
        kind: AssetKind,
        len: usize,
        message: String,
    },

    #[error("failed to read file {fdid}: {message}")]
    Read { fdid: Fdid, message: String },

    #[error("failed to store edges for {fdid}: {source}")]
    Store {
        fdid: Fdid,
        #[source]
        source: rusqlite::Error,
    },

    #[error("types not detected for {0}")]
    ClassificationMissing(AssetKind),
}

impl LinkError {
    pub fn fdid(&self) -> Fdid {
        match self {
            LinkError::NotFound(fdid) => *fdid,
            LinkError::UnsupportedVariant { fdid, .. } => *fdid,
            LinkError::Decode { fdid, .. } => *fdid,
            LinkError::Read { fdid, .. } => *fdid,
            LinkError::Store { fdid, .. } => *fdid,
            LinkError::ClassificationMissing(_) => 0,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LinkError::NotFound(_) => FDL_LNK_001_NOT_FOUND,
            LinkError::UnsupportedVariant { .. } => FDL_LNK_002_UNSUPPORTED_VARIANT,
            LinkError::Decode { .. } => FDL_LNK_003_DECODE_FAILED,
            LinkError::Read { .. } => FDL_LNK_004_READ_FAILED,
            LinkError::Store { .. } => FDL_DB_001_STORE_FAILED,
            LinkError::ClassificationMissing(_) => FDL_LNK_005_UNCLASSIFIED,
        }
    }

    pub fn stage(&self) -> DiagnosticStage {
        match self {
            LinkError::NotFound(_) | LinkError::Read { .. } => DiagnosticStage::Read,
            LinkError::UnsupportedVariant { kind, .. } | LinkError::Decode { kind, .. } => {
                DiagnosticStage::decode(*kind)
            }
            LinkError::Store { .. } => DiagnosticStage::Store,
            LinkError::ClassificationMissing(_) => DiagnosticStage::Other,
        }
    }

    pub fn to_diagnostic(&self) -> LinkDiagnostic {
        match self {
            LinkError::ClassificationMissing(kind) => LinkDiagnostic::unclassified(*kind),
            other => LinkDiagnostic::error(other.fdid(), other.stage(), other.to_string()),
        }
    }
}

impl From<ArchiveError> for LinkError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::NotFound(fdid) => LinkError::NotFound(fdid),
            ArchiveError::Read { fdid, message } => LinkError::Read { fdid, message },
        }
    }
}
