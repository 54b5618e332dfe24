//! Decoded records
//!
//! The subset of each format's structure that carries file references.
//! Reader implementations fill these from their own parsed representation.
//! Every id uses 0 for "no reference".

use serde::{Deserialize, Serialize};

use crate::graph::Fdid;

/// M2 model references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelRecord {
    /// TXID
    pub texture_file_data_ids: Vec<Fdid>,
    /// AFID
    pub anim_file_data_ids: Vec<AnimFileEntry>,
    /// SFID
    pub skin_file_data_ids: Vec<Fdid>,
    /// BFID
    pub bone_file_data_ids: Vec<Fdid>,
    /// RPID
    pub recursive_particle_model_ids: Vec<Fdid>,
    /// GPID
    pub geometry_particle_model_ids: Vec<Fdid>,
    /// SKID
    pub skeleton_file_id: Fdid,
    /// PFID
    pub physics_file_id: Fdid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimFileEntry {
    pub anim_id: u16,
    pub sub_anim_id: u16,
    pub file_data_id: Fdid,
}

/// Root WMO references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerRecord {
    /// GFID
    pub group_file_data_ids: Vec<Fdid>,
    /// MODI
    pub doodad_ids: Vec<Fdid>,
    /// MOTX: inline texture filenames. `None` when the chunk is absent, which
    /// is what makes the material slots carry FDIDs instead of offsets.
    pub textures: Option<Vec<String>>,
    /// MOMT
    pub materials: Vec<Material>,
}

/// One WMO material.
///
/// Only the fields that can hold texture ids are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub shader: u32,
    pub texture1: Fdid,
    pub texture2: Fdid,
    pub texture3: Fdid,
    pub color3: u32,
    pub flags3: u32,
    pub runtime_data: [u32; 4],
}

impl Material {
    /// Shader whose extended slots hold texture FDIDs
    pub const EXTENDED_TEXTURE_SHADER: u32 = 23;

    /// Texture FDIDs this material references, zeros included.
    ///
    /// Slots 1-3 always; `color3`, `flags3` and the runtime data words only
    /// for the extended-texture shader, where they are reused as ids.
    pub fn texture_ids(&self) -> Vec<Fdid> {
        let mut ids = vec![self.texture1, self.texture2, self.texture3];
        if self.shader == Self::EXTENDED_TEXTURE_SHADER {
            ids.push(self.color3);
            ids.push(self.flags3);
            ids.extend_from_slice(&self.runtime_data);
        }
        ids
    }
}

/// WDT references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldRecord {
    /// MODF: map-wide WMO placements; only the first entry is meaningful
    pub map_objects: Vec<ObjectPlacement>,
    /// MAID rows in table order
    pub tiles: Vec<TileEntry>,
}

/// One MAID row: the files that make up a terrain tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileEntry {
    pub x: u8,
    pub y: u8,
    pub root_adt: Fdid,
    pub obj0_adt: Fdid,
    pub obj1_adt: Fdid,
    pub tex0_adt: Fdid,
    pub lod_adt: Fdid,
    pub map_texture: Fdid,
    pub map_texture_n: Fdid,
    pub minimap_texture: Fdid,
}

/// MODF/MDDF placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPlacement {
    /// FDID of the placed model (with the name-id flag already resolved)
    pub id: Fdid,
    pub unique_id: u32,
}

/// ADT references, merged across root/obj0/tex0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileRecord {
    /// MMDX: inline model filenames from pre-FDID tiles
    pub model_filenames: Option<Vec<String>>,
    /// MODF
    pub world_models: Vec<ObjectPlacement>,
    /// MDDF
    pub doodads: Vec<ObjectPlacement>,
    /// MDID
    pub diffuse_texture_ids: Vec<Fdid>,
    /// MHID
    pub height_texture_ids: Vec<Fdid>,
}

impl TileRecord {
    /// Tile still names its models inline instead of by FDID
    pub fn uses_legacy_filenames(&self) -> bool {
        self.model_filenames.is_some()
    }
}
