//! WDT world definition extractor
//!
//! Emits the map-wide WMO placement and each tile's eight sub-file references
//! against the world definition, then descends into each tile root that is not
//! yet a known parent.

use super::{decode_error, load, tile, EdgeBuffer, ExtractContext, Extracted, Extraction};
use crate::archive::{ArchiveError, AssetKind};
use crate::diagnostics::{LinkDiagnostic, SkipReason};
use crate::error::LinkError;
use crate::formats::TileEntry;
use crate::graph::{Fdid, LinkKind};

/// Filename fragments of WDTs that carry no tile table of their own
pub const AUXILIARY_MARKERS: [&str; 5] = ["_mpv", "_lgt", "_occ", "_fogs", "_preload"];

pub fn is_auxiliary(filename: &str) -> bool {
    AUXILIARY_MARKERS
        .iter()
        .any(|marker| filename.contains(marker))
}

/// Extract a world definition and all of its not-yet-linked tiles.
///
/// Any tile decode failure fails the whole world definition, so the caller
/// writes nothing for it.
pub fn extract(ctx: ExtractContext<'_>, fdid: Fdid) -> Result<Extracted, LinkError> {
    let filename = match ctx.archive.filename(fdid) {
        Ok(name) => name,
        Err(ArchiveError::NotFound(_)) => return Ok(Extracted::Skipped(SkipReason::NoFilename)),
        Err(e) => return Err(e.into()),
    };
    if is_auxiliary(&filename.to_lowercase()) {
        return Ok(Extracted::Skipped(SkipReason::AuxiliaryWorldFile));
    }

    let Some(bytes) = load(&ctx, fdid)? else {
        return Ok(Extracted::Skipped(SkipReason::NotInArchive));
    };
    let record = ctx
        .readers
        .world
        .read_world(fdid, &bytes)
        .map_err(|e| decode_error(fdid, AssetKind::WorldDefinition, bytes.len(), e))?;

    let mut out = EdgeBuffer::new(fdid);
    let mut extraction = Extraction::default();
    let world_known = || !ctx.force && ctx.parents.contains(fdid);

    if let Some(first) = record.map_objects.first() {
        if first.id != 0 && !world_known() {
            out.push(first.id, LinkKind::WorldMapObject);
        }
    }

    for entry in &record.tiles {
        if !world_known() {
            push_tile_references(&mut out, entry);
        }

        let root = entry.root_adt;
        if root == 0 || ctx.parents.contains(root) {
            continue;
        }

        // Keep the world's references ahead of this tile's own edges
        extraction.edges.extend(out.take());
        match tile::extract(ctx, fdid, entry)? {
            Extracted::Linked(tile) => extraction.absorb(tile),
            Extracted::Skipped(reason) => extraction
                .diagnostics
                .push(LinkDiagnostic::skipped(root, reason)),
            Extracted::Reclassified(_) => {}
        }
    }

    extraction.edges.extend(out.into_edges());
    Ok(Extracted::Linked(extraction))
}

fn push_tile_references(out: &mut EdgeBuffer, entry: &TileEntry) {
    out.push(entry.root_adt, LinkKind::RootTile);
    out.push(entry.tex0_adt, LinkKind::Tex0Tile);
    out.push(entry.lod_adt, LinkKind::LodTile);
    out.push(entry.obj0_adt, LinkKind::Obj0Tile);
    out.push(entry.obj1_adt, LinkKind::Obj1Tile);
    out.push(entry.map_texture, LinkKind::MapTexture);
    out.push(entry.map_texture_n, LinkKind::MapNormalTexture);
    out.push(entry.minimap_texture, LinkKind::MinimapTexture);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::extract::test_support::{linked, pairs, Fixture};
    use crate::formats::{MemoryRecords, ObjectPlacement, TileRecord, WorldRecord};

    fn world_fixture(world: WorldRecord, tiles: Vec<(Fdid, TileRecord)>) -> Fixture {
        let mut archive = MemoryArchive::new();
        archive.add(1, "world/maps/test/test.wdt", AssetKind::WorldDefinition, vec![0; 8]);
        let mut records = MemoryRecords::new();
        records.add_world(1, world);
        for (root, record) in tiles {
            archive.insert_file(root, vec![0; 16]);
            records.add_tile(root, record);
        }
        Fixture::new(archive, records)
    }

    fn tile_entry(root: Fdid) -> TileEntry {
        TileEntry {
            root_adt: root,
            ..Default::default()
        }
    }

    #[test]
    fn test_auxiliary_names() {
        assert!(is_auxiliary("world/maps/azeroth/azeroth_lgt.wdt"));
        assert!(is_auxiliary("world/maps/azeroth/azeroth_preload.wdt"));
        assert!(!is_auxiliary("world/maps/azeroth/azeroth.wdt"));
    }

    #[test]
    fn test_world_with_one_tile() {
        let fixture = world_fixture(
            WorldRecord {
                tiles: vec![tile_entry(50)],
                ..Default::default()
            },
            vec![(
                50,
                TileRecord {
                    world_models: vec![
                        ObjectPlacement { id: 20, unique_id: 1 },
                        ObjectPlacement { id: 20, unique_id: 2 },
                        ObjectPlacement { id: 30, unique_id: 3 },
                    ],
                    ..Default::default()
                },
            )],
        );

        let extraction = linked(extract(fixture.ctx(), 1));
        assert_eq!(
            pairs(&extraction.edges),
            vec![
                (1, 50, LinkKind::RootTile),
                (50, 20, LinkKind::TileWorldModel),
                (50, 30, LinkKind::TileWorldModel),
            ]
        );
        assert_eq!(extraction.linked, vec![50]);
    }

    #[test]
    fn test_map_object_and_all_tile_references() {
        let fixture = world_fixture(
            WorldRecord {
                map_objects: vec![
                    ObjectPlacement { id: 900, unique_id: 0 },
                    ObjectPlacement { id: 901, unique_id: 1 },
                ],
                tiles: vec![TileEntry {
                    x: 1,
                    y: 2,
                    root_adt: 0,
                    obj0_adt: 11,
                    obj1_adt: 12,
                    tex0_adt: 13,
                    lod_adt: 14,
                    map_texture: 15,
                    map_texture_n: 16,
                    minimap_texture: 17,
                }],
            },
            vec![],
        );

        let extraction = linked(extract(fixture.ctx(), 1));
        assert_eq!(
            pairs(&extraction.edges),
            vec![
                (1, 900, LinkKind::WorldMapObject),
                (1, 13, LinkKind::Tex0Tile),
                (1, 14, LinkKind::LodTile),
                (1, 11, LinkKind::Obj0Tile),
                (1, 12, LinkKind::Obj1Tile),
                (1, 15, LinkKind::MapTexture),
                (1, 16, LinkKind::MapNormalTexture),
                (1, 17, LinkKind::MinimapTexture),
            ]
        );
        assert!(extraction.linked.is_empty());
    }

    #[test]
    fn test_known_tile_root_is_not_descended() {
        let fixture = world_fixture(
            WorldRecord {
                tiles: vec![tile_entry(50)],
                ..Default::default()
            },
            vec![(
                50,
                TileRecord {
                    doodads: vec![ObjectPlacement { id: 20, unique_id: 1 }],
                    ..Default::default()
                },
            )],
        );
        fixture.parents.insert(50);

        let extraction = linked(extract(fixture.ctx(), 1));
        assert_eq!(pairs(&extraction.edges), vec![(1, 50, LinkKind::RootTile)]);
    }

    #[test]
    fn test_known_world_skips_own_references_but_descends() {
        let fixture = world_fixture(
            WorldRecord {
                map_objects: vec![ObjectPlacement { id: 900, unique_id: 0 }],
                tiles: vec![tile_entry(50)],
            },
            vec![(
                50,
                TileRecord {
                    diffuse_texture_ids: vec![60],
                    ..Default::default()
                },
            )],
        );
        fixture.parents.insert(1);

        let extraction = linked(extract(fixture.ctx(), 1));
        assert_eq!(
            pairs(&extraction.edges),
            vec![(50, 60, LinkKind::TileDiffuseTexture)]
        );
    }

    #[test]
    fn test_missing_tile_root_is_noted() {
        let fixture = world_fixture(
            WorldRecord {
                tiles: vec![tile_entry(50)],
                ..Default::default()
            },
            vec![],
        );

        let extraction = linked(extract(fixture.ctx(), 1));
        assert_eq!(pairs(&extraction.edges), vec![(1, 50, LinkKind::RootTile)]);
        assert_eq!(
            extraction.diagnostics,
            vec![LinkDiagnostic::skipped(50, SkipReason::NotInArchive)]
        );
    }

    #[test]
    fn test_tile_decode_failure_fails_world() {
        let mut archive = MemoryArchive::new();
        archive.add(1, "world/maps/test/test.wdt", AssetKind::WorldDefinition, vec![0]);
        archive.insert_file(50, vec![0]);
        archive.insert_file(51, vec![0]);
        let mut records = MemoryRecords::new();
        records
            .add_world(
                1,
                WorldRecord {
                    tiles: vec![tile_entry(50), tile_entry(51)],
                    ..Default::default()
                },
            )
            .add_tile(50, TileRecord::default())
            .add_malformed(51, "bad chunk");
        let fixture = Fixture::new(archive, records);

        assert!(matches!(
            extract(fixture.ctx(), 1),
            Err(LinkError::Decode { fdid: 1, .. })
        ));
    }

    #[test]
    fn test_unnamed_and_auxiliary_worlds_are_skipped() {
        let mut archive = MemoryArchive::new();
        archive.insert_file(1, vec![0]);
        archive.add(2, "world/maps/test/test_occ.wdt", AssetKind::WorldDefinition, vec![0]);
        let fixture = Fixture::new(archive, MemoryRecords::new());

        assert!(matches!(
            extract(fixture.ctx(), 1),
            Ok(Extracted::Skipped(SkipReason::NoFilename))
        ));
        assert!(matches!(
            extract(fixture.ctx(), 2),
            Ok(Extracted::Skipped(SkipReason::AuxiliaryWorldFile))
        ));
    }
}
