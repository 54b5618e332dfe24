//! Type-specific extractors
//!
//! Each extractor decodes one asset through its reader and returns the edges
//! it found. Extractors never touch the edge store: they read the archive, the
//! readers and the existing-parent index, so a chunk of them can run on the
//! rayon pool while the linker applies results serially.

pub mod container;
pub mod model;
pub mod tile;
pub mod world;

use ahash::AHashSet;

use crate::archive::{Archive, AssetKind};
use crate::diagnostics::{LinkDiagnostic, SkipReason};
use crate::error::LinkError;
use crate::formats::{FormatError, Readers};
use crate::graph::{Edge, Fdid, LinkKind, ParentIndex};

/// Everything an extractor may read
#[derive(Clone, Copy)]
pub struct ExtractContext<'a> {
    pub archive: &'a dyn Archive,
    pub readers: &'a Readers,
    pub parents: &'a ParentIndex,
    /// The entity being extracted is relinked even if `parents` lists it
    pub force: bool,
}

/// Result of extracting one entity
#[derive(Debug)]
pub enum Extracted {
    /// Decoded; write these edges and record the entity as processed
    Linked(Extraction),
    /// Nothing to do for this entity
    Skipped(SkipReason),
    /// Entity was misclassified; re-tag it and write nothing
    Reclassified(AssetKind),
}

/// Edges and side effects of one successful extraction
#[derive(Debug, Default)]
pub struct Extraction {
    /// In emission order
    pub edges: Vec<Edge>,
    /// Parents other than the entity itself to record as processed
    pub linked: Vec<Fdid>,
    /// Type corrections discovered while decoding
    pub retags: Vec<(Fdid, AssetKind)>,
    /// Non-fatal notes (skipped tiles, legacy placements)
    pub diagnostics: Vec<LinkDiagnostic>,
}

impl Extraction {
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        Self {
            edges,
            ..Default::default()
        }
    }

    /// Append another extraction's results after this one's
    pub fn absorb(&mut self, other: Extraction) {
        self.edges.extend(other.edges);
        self.linked.extend(other.linked);
        self.retags.extend(other.retags);
        self.diagnostics.extend(other.diagnostics);
    }
}

/// Dispatch on the externally supplied kind
pub fn extract(ctx: ExtractContext<'_>, kind: AssetKind, fdid: Fdid) -> Result<Extracted, LinkError> {
    match kind {
        AssetKind::Model => model::extract(ctx, fdid),
        AssetKind::ModelContainer => container::extract(ctx, fdid),
        AssetKind::WorldDefinition => world::extract(ctx, fdid),
        AssetKind::ContainerGroup | AssetKind::TerrainTile | AssetKind::Unknown => {
            Ok(Extracted::Skipped(SkipReason::NotLinkable))
        }
    }
}

/// Collects edges for one parent at a time, dropping zero children
#[derive(Debug)]
pub(crate) struct EdgeBuffer {
    parent: Fdid,
    edges: Vec<Edge>,
}

impl EdgeBuffer {
    pub(crate) fn new(parent: Fdid) -> Self {
        Self {
            parent,
            edges: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, child: Fdid, kind: LinkKind) {
        if child != 0 {
            self.edges.push(Edge::new(self.parent, child, kind));
        }
    }

    pub(crate) fn push_all(&mut self, children: &[Fdid], kind: LinkKind) {
        for &child in children {
            self.push(child, kind.clone());
        }
    }

    /// Push unless `child` was already emitted under this seen-set
    pub(crate) fn push_unique(&mut self, seen: &mut AHashSet<Fdid>, child: Fdid, kind: LinkKind) {
        if child != 0 && seen.insert(child) {
            self.edges.push(Edge::new(self.parent, child, kind));
        }
    }

    /// Hand over the edges collected so far and keep collecting
    pub(crate) fn take(&mut self) -> Vec<Edge> {
        std::mem::take(&mut self.edges)
    }

    pub(crate) fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

/// Content for `fdid`, or `None` when the archive does not have it
pub(crate) fn load(ctx: &ExtractContext<'_>, fdid: Fdid) -> Result<Option<Vec<u8>>, LinkError> {
    if !ctx.archive.exists(fdid) {
        return Ok(None);
    }
    Ok(Some(ctx.archive.open(fdid)?))
}

pub(crate) fn decode_error(fdid: Fdid, kind: AssetKind, len: usize, err: FormatError) -> LinkError {
    match err {
        FormatError::UnsupportedVariant(message) => LinkError::UnsupportedVariant {
            fdid,
            kind,
            message,
        },
        malformed @ FormatError::Malformed(_) => LinkError::Decode {
            fdid,
            kind,
            len,
            message: malformed.to_string(),
        },
    }
}
