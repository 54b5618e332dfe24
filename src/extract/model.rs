//! M2 model extractor

use super::{decode_error, load, EdgeBuffer, ExtractContext, Extracted, Extraction};
use crate::archive::AssetKind;
use crate::diagnostics::SkipReason;
use crate::error::LinkError;
use crate::formats::ModelRecord;
use crate::graph::{Edge, Fdid, LinkKind};

pub fn extract(ctx: ExtractContext<'_>, fdid: Fdid) -> Result<Extracted, LinkError> {
    let Some(bytes) = load(&ctx, fdid)? else {
        return Ok(Extracted::Skipped(SkipReason::NotInArchive));
    };

    let record = ctx
        .readers
        .model
        .read_model(fdid, &bytes)
        .map_err(|e| decode_error(fdid, AssetKind::Model, bytes.len(), e))?;

    Ok(Extracted::Linked(Extraction::from_edges(model_edges(
        fdid, &record,
    ))))
}

/// Edges in chunk order: TXID, AFID, SFID, BFID, RPID, GPID, SKID, PFID
pub fn model_edges(fdid: Fdid, record: &ModelRecord) -> Vec<Edge> {
    let mut out = EdgeBuffer::new(fdid);

    out.push_all(&record.texture_file_data_ids, LinkKind::ModelTexture);
    for anim in &record.anim_file_data_ids {
        out.push(anim.file_data_id, LinkKind::ModelAnim);
    }
    out.push_all(&record.skin_file_data_ids, LinkKind::ModelSkin);
    out.push_all(&record.bone_file_data_ids, LinkKind::ModelBone);
    out.push_all(
        &record.recursive_particle_model_ids,
        LinkKind::ModelRecursiveParticle,
    );
    out.push_all(
        &record.geometry_particle_model_ids,
        LinkKind::ModelGeometryParticle,
    );
    out.push(record.skeleton_file_id, LinkKind::ModelSkeleton);
    out.push(record.physics_file_id, LinkKind::ModelPhysics);

    out.into_edges()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::extract::test_support::{linked, pairs, Fixture};
    use crate::formats::{AnimFileEntry, MemoryRecords};

    #[test]
    fn test_textures_and_skeleton() {
        let record = ModelRecord {
            texture_file_data_ids: vec![5, 0, 7],
            skeleton_file_id: 9,
            ..Default::default()
        };

        assert_eq!(
            pairs(&model_edges(100, &record)),
            vec![
                (100, 5, LinkKind::ModelTexture),
                (100, 7, LinkKind::ModelTexture),
                (100, 9, LinkKind::ModelSkeleton),
            ]
        );
    }

    #[test]
    fn test_every_role_is_labeled() {
        let record = ModelRecord {
            texture_file_data_ids: vec![1],
            anim_file_data_ids: vec![AnimFileEntry {
                anim_id: 0,
                sub_anim_id: 0,
                file_data_id: 2,
            }],
            skin_file_data_ids: vec![3],
            bone_file_data_ids: vec![4],
            recursive_particle_model_ids: vec![5],
            geometry_particle_model_ids: vec![6],
            skeleton_file_id: 7,
            physics_file_id: 8,
        };

        let kinds: Vec<LinkKind> = model_edges(10, &record)
            .into_iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                LinkKind::ModelTexture,
                LinkKind::ModelAnim,
                LinkKind::ModelSkin,
                LinkKind::ModelBone,
                LinkKind::ModelRecursiveParticle,
                LinkKind::ModelGeometryParticle,
                LinkKind::ModelSkeleton,
                LinkKind::ModelPhysics,
            ]
        );
    }

    #[test]
    fn test_empty_record_has_no_edges() {
        assert!(model_edges(10, &ModelRecord::default()).is_empty());
    }

    #[test]
    fn test_missing_content_is_skipped() {
        let fixture = Fixture::new(MemoryArchive::new(), MemoryRecords::new());
        assert!(matches!(
            extract(fixture.ctx(), 100),
            Ok(Extracted::Skipped(SkipReason::NotInArchive))
        ));
    }

    #[test]
    fn test_decode_failure_reports_length() {
        let mut archive = MemoryArchive::new();
        archive.insert_file(100, vec![0; 12]);
        let mut records = MemoryRecords::new();
        records.add_malformed(100, "bad magic");
        let fixture = Fixture::new(archive, records);

        match extract(fixture.ctx(), 100) {
            Err(LinkError::Decode { fdid, len, .. }) => {
                assert_eq!(fdid, 100);
                assert_eq!(len, 12);
            }
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_variant_is_not_a_decode_failure() {
        let mut archive = MemoryArchive::new();
        archive.insert_file(100, vec![0; 12]);
        let mut records = MemoryRecords::new();
        records.add_unsupported(100, "MD20 without chunks");
        let fixture = Fixture::new(archive, records);

        match extract(fixture.ctx(), 100) {
            Err(err @ LinkError::UnsupportedVariant { .. }) => {
                assert_eq!(err.fdid(), 100);
                assert_eq!(err.code(), crate::error_codes::FDL_LNK_002_UNSUPPORTED_VARIANT);
            }
            other => panic!("expected UnsupportedVariant, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_through_reader() {
        let mut archive = MemoryArchive::new();
        archive.insert_file(100, vec![1]);
        let mut records = MemoryRecords::new();
        records.add_model(
            100,
            ModelRecord {
                skin_file_data_ids: vec![11, 12],
                ..Default::default()
            },
        );
        let fixture = Fixture::new(archive, records);

        let extraction = linked(extract(fixture.ctx(), 100));
        assert_eq!(extraction.edges.len(), 2);
        assert!(extraction.linked.is_empty());
    }
}
