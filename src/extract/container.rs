//! Root WMO extractor
//!
//! Group files are frequently tagged as root WMOs by type detection. The
//! reader reports those as an unsupported variant and the file is re-tagged
//! instead of linked.

use ahash::AHashSet;

use super::{decode_error, load, EdgeBuffer, ExtractContext, Extracted, Extraction};
use crate::archive::AssetKind;
use crate::diagnostics::SkipReason;
use crate::error::LinkError;
use crate::formats::{ContainerRecord, FormatError};
use crate::graph::{Edge, Fdid, LinkKind};

pub fn extract(ctx: ExtractContext<'_>, fdid: Fdid) -> Result<Extracted, LinkError> {
    let Some(bytes) = load(&ctx, fdid)? else {
        return Ok(Extracted::Skipped(SkipReason::NotInArchive));
    };

    let record = match ctx.readers.container.read_container(fdid, &bytes) {
        Ok(record) => record,
        Err(FormatError::UnsupportedVariant(_)) => {
            return Ok(Extracted::Reclassified(AssetKind::ContainerGroup));
        }
        Err(e) => return Err(decode_error(fdid, AssetKind::ModelContainer, bytes.len(), e)),
    };

    let mut extraction = Extraction::from_edges(container_edges(fdid, &record));
    extraction.retags = record
        .group_file_data_ids
        .iter()
        .filter(|&&group| group != 0)
        .map(|&group| (group, AssetKind::ContainerGroup))
        .collect();
    Ok(Extracted::Linked(extraction))
}

/// Group edges, then doodads, then material textures.
///
/// Doodads and textures share one seen-set: a child already emitted under
/// this parent is not emitted again under the other role.
pub fn container_edges(fdid: Fdid, record: &ContainerRecord) -> Vec<Edge> {
    let mut out = EdgeBuffer::new(fdid);
    let mut seen = AHashSet::new();

    out.push_all(&record.group_file_data_ids, LinkKind::ContainerGroup);

    for &doodad in &record.doodad_ids {
        out.push_unique(&mut seen, doodad, LinkKind::ContainerDoodad);
    }

    // Material slots only hold FDIDs once MOTX is gone
    if record.textures.is_none() {
        for material in &record.materials {
            for texture in material.texture_ids() {
                out.push_unique(&mut seen, texture, LinkKind::ContainerTexture);
            }
        }
    }

    out.into_edges()
}
