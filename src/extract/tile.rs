//! ADT terrain tile extractor
//!
//! Tiles are only reached through their world definition. Edges are
//! attributed to the tile's root FDID.

use ahash::AHashSet;

use super::{load, EdgeBuffer, ExtractContext, Extracted, Extraction};
use crate::archive::AssetKind;
use crate::diagnostics::{LinkDiagnostic, SkipReason};
use crate::error::LinkError;
use crate::formats::{TileEntry, TileFiles, TileRecord};
use crate::graph::{Edge, Fdid, LinkKind};

/// Decode the tile's root/obj0/tex0 files and emit its edges.
///
/// `world` is the owning world definition; decode failures are reported
/// against it since they abort the whole world definition.
pub fn extract(
    ctx: ExtractContext<'_>,
    world: Fdid,
    tile: &TileEntry,
) -> Result<Extracted, LinkError> {
    let root = tile.root_adt;
    let Some(root_bytes) = load(&ctx, root)? else {
        return Ok(Extracted::Skipped(SkipReason::NotInArchive));
    };

    let files = TileFiles {
        root: root_bytes,
        obj0: load_optional(&ctx, tile.obj0_adt)?,
        tex0: load_optional(&ctx, tile.tex0_adt)?,
    };

    let record = ctx
        .readers
        .tile
        .read_tile(tile, &files)
        .map_err(|e| LinkError::Decode {
            fdid: world,
            kind: AssetKind::TerrainTile,
            len: files.total_len(),
            message: format!("tile {}_{} (root {}): {}", tile.x, tile.y, root, e),
        })?;

    let mut extraction = Extraction::from_edges(tile_edges(root, &record));
    if record.uses_legacy_filenames() {
        extraction
            .diagnostics
            .push(LinkDiagnostic::skipped(root, SkipReason::LegacyFilenames));
    }
    extraction.linked.push(root);
    Ok(Extracted::Linked(extraction))
}

fn load_optional(ctx: &ExtractContext<'_>, fdid: Fdid) -> Result<Option<Vec<u8>>, LinkError> {
    if fdid == 0 {
        return Ok(None);
    }
    load(ctx, fdid)
}

/// Placements (world models, then doodads, one edge per unique id), then
/// diffuse and height textures.
///
/// Tiles that still carry inline model filenames have no usable placement
/// ids; only their textures are linked.
pub fn tile_edges(root: Fdid, record: &TileRecord) -> Vec<Edge> {
    let mut out = EdgeBuffer::new(root);

    if !record.uses_legacy_filenames() {
        let mut seen = AHashSet::new();
        for placement in &record.world_models {
            out.push_unique(&mut seen, placement.id, LinkKind::TileWorldModel);
        }
        for placement in &record.doodads {
            out.push_unique(&mut seen, placement.id, LinkKind::TileDoodad);
        }
    }

    out.push_all(&record.diffuse_texture_ids, LinkKind::TileDiffuseTexture);
    out.push_all(&record.height_texture_ids, LinkKind::TileHeightTexture);

    out.into_edges()
}
