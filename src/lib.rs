//! fdlink: a deterministic FileDataID dependency linker
//!
//! fdlink walks the files of a content-addressed game archive by detected
//! type, decodes the ones that embed FileDataID references (M2 models, root
//! WMOs, WDTs and their ADT tiles) and persists every reference as a labeled
//! parent → child edge in SQLite.
//!
//! # Layers
//!
//! - [`archive`]: what the linker needs from the archive (content, listfile
//!   names, type index), plus in-memory implementations
//! - [`formats`]: reader interfaces yielding reference-carrying records
//! - [`extract`]: one pure extractor per asset kind
//! - [`graph`]: the SQLite edge store and existing-parent index
//! - [`linker`]: batching, idempotency and force-recheck policy
//!
//! Runs are idempotent: an entity already recorded as a parent is not decoded
//! again unless the run is forced, and duplicate edges are no-ops.

pub mod archive;
pub mod diagnostics;
pub mod error;
pub mod error_codes;
pub mod extract;
pub mod formats;
pub mod graph;
pub mod linker;
pub mod output;

pub use archive::{
    Archive, ArchiveError, AssetKind, ContentSource, FilenameResolver, Listfile, MemoryArchive,
    TypeMap, TypeRegistry,
};
pub use diagnostics::{DiagnosticStage, LinkDiagnostic, SkipReason};
pub use error::LinkError;
pub use extract::{Extracted, Extraction};
pub use formats::{FormatError, MemoryRecords, Readers};
pub use graph::{
    Edge, ExportFormat, ExportSummary, Fdid, InsertOutcome, LinkGraph, LinkKind, LinkedFile,
    ParentIndex, RunRecord, FDLINK_SCHEMA_VERSION,
};
pub use linker::{KindSummary, LinkConfig, LinkOutcome, LinkProgress, LinkReport, Linker};
pub use output::{generate_execution_id, output_json, JsonResponse, OutputFormat};
