//! Detected asset kinds
//!
//! Tags assigned by the archive's out-of-band type detection. The tag strings
//! are the ones type caches already store ("m2", "wmo", ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Detected kind of an archive file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// M2 model
    Model,
    /// Root WMO (composite object)
    ModelContainer,
    /// WMO group file, a member of some root WMO
    ContainerGroup,
    /// WDT world definition
    WorldDefinition,
    /// ADT terrain tile
    TerrainTile,
    Unknown,
}

impl AssetKind {
    /// Kinds `link_all` walks, in pass order
    pub const LINKABLE: [AssetKind; 3] = [
        AssetKind::Model,
        AssetKind::ModelContainer,
        AssetKind::WorldDefinition,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            AssetKind::Model => "m2",
            AssetKind::ModelContainer => "wmo",
            AssetKind::ContainerGroup => "gwmo",
            AssetKind::WorldDefinition => "wdt",
            AssetKind::TerrainTile => "adt",
            AssetKind::Unknown => "unk",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "m2" => AssetKind::Model,
            "wmo" => AssetKind::ModelContainer,
            "gwmo" => AssetKind::ContainerGroup,
            "wdt" => AssetKind::WorldDefinition,
            "adt" => AssetKind::TerrainTile,
            _ => AssetKind::Unknown,
        }
    }

    /// Whether the orchestrator can link this kind directly.
    ///
    /// Terrain tiles are only reached through their world definition.
    pub fn is_linkable(&self) -> bool {
        Self::LINKABLE.contains(self)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
