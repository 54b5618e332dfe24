//! Graph schema definitions for fdlink
//!
//! Defines edge payloads and the SQLite tables they persist to.

use serde::{Deserialize, Serialize};
use std::fmt;

use anyhow::Result;

/// FileDataID: a 32-bit asset identifier within one archive build.
///
/// Zero is the "absent reference" sentinel and never appears as an edge child.
pub type Fdid = u32;

/// Schema version stored in `schema_meta`
pub const FDLINK_SCHEMA_VERSION: i64 = 2;

/// Edge table name, shared with existing wow.tools link databases
pub const LINKS_TABLE: &str = "wow_rootfiles_links";

/// Semantic role of a parent → child reference.
///
/// Each variant has a stable on-disk label. Labels written by other tools
/// that do not map to a known variant round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkKind {
    ModelTexture,
    ModelAnim,
    ModelSkin,
    ModelBone,
    ModelRecursiveParticle,
    ModelGeometryParticle,
    ModelSkeleton,
    ModelPhysics,
    ContainerGroup,
    ContainerDoodad,
    ContainerTexture,
    WorldMapObject,
    RootTile,
    Tex0Tile,
    LodTile,
    Obj0Tile,
    Obj1Tile,
    MapTexture,
    MapNormalTexture,
    MinimapTexture,
    TileWorldModel,
    TileDoodad,
    TileDiffuseTexture,
    TileHeightTexture,
    Other(String),
}

impl LinkKind {
    /// On-disk label for this kind
    pub fn as_str(&self) -> &str {
        match self {
            LinkKind::ModelTexture => "m2 texture",
            LinkKind::ModelAnim => "m2 anim",
            LinkKind::ModelSkin => "m2 skin",
            LinkKind::ModelBone => "m2 bone",
            LinkKind::ModelRecursiveParticle => "m2 recursive particle",
            LinkKind::ModelGeometryParticle => "m2 geometry particle",
            LinkKind::ModelSkeleton => "m2 skel",
            LinkKind::ModelPhysics => "m2 phys",
            LinkKind::ContainerGroup => "wmo group",
            LinkKind::ContainerDoodad => "wmo doodad",
            LinkKind::ContainerTexture => "wmo texture",
            LinkKind::WorldMapObject => "wdt wmo",
            LinkKind::RootTile => "root adt",
            LinkKind::Tex0Tile => "tex0 adt",
            LinkKind::LodTile => "lod adt",
            LinkKind::Obj0Tile => "obj0 adt",
            LinkKind::Obj1Tile => "obj1 adt",
            LinkKind::MapTexture => "map texture",
            LinkKind::MapNormalTexture => "mapn texture",
            LinkKind::MinimapTexture => "minimap texture",
            LinkKind::TileWorldModel => "adt worldmodel",
            LinkKind::TileDoodad => "adt doodad",
            LinkKind::TileDiffuseTexture => "adt diffuse texture",
            LinkKind::TileHeightTexture => "adt height texture",
            LinkKind::Other(label) => label,
        }
    }

    /// Parse an on-disk label. Never fails: unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "m2 texture" => LinkKind::ModelTexture,
            "m2 anim" => LinkKind::ModelAnim,
            "m2 skin" => LinkKind::ModelSkin,
            "m2 bone" => LinkKind::ModelBone,
            "m2 recursive particle" => LinkKind::ModelRecursiveParticle,
            "m2 geometry particle" => LinkKind::ModelGeometryParticle,
            "m2 skel" => LinkKind::ModelSkeleton,
            "m2 phys" => LinkKind::ModelPhysics,
            "wmo group" => LinkKind::ContainerGroup,
            "wmo doodad" => LinkKind::ContainerDoodad,
            "wmo texture" => LinkKind::ContainerTexture,
            "wdt wmo" => LinkKind::WorldMapObject,
            "root adt" => LinkKind::RootTile,
            "tex0 adt" => LinkKind::Tex0Tile,
            "lod adt" => LinkKind::LodTile,
            "obj0 adt" => LinkKind::Obj0Tile,
            "obj1 adt" => LinkKind::Obj1Tile,
            "map texture" => LinkKind::MapTexture,
            "mapn texture" => LinkKind::MapNormalTexture,
            "minimap texture" => LinkKind::MinimapTexture,
            "adt worldmodel" => LinkKind::TileWorldModel,
            "adt doodad" => LinkKind::TileDoodad,
            "adt diffuse texture" => LinkKind::TileDiffuseTexture,
            "adt height texture" => LinkKind::TileHeightTexture,
            other => LinkKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LinkKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LinkKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(LinkKind::from_label(&label))
    }
}

/// A directed, labeled edge parent → child
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub parent: Fdid,
    pub child: Fdid,
    pub kind: LinkKind,
}

impl Edge {
    pub fn new(parent: Fdid, child: Fdid, kind: LinkKind) -> Self {
        Self {
            parent,
            child,
            kind,
        }
    }
}

/// One outgoing reference of a parent, as returned by the read path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedFile {
    pub file_data_id: Fdid,
    pub link_type: LinkKind,
}

/// Create all fdlink tables if they do not exist yet.
///
/// The links table keeps the three-column layout of existing link databases;
/// the composite primary key is what turns duplicate inserts into constraint
/// violations.
pub fn ensure_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {LINKS_TABLE} (
            parent INTEGER NOT NULL,
            child INTEGER NOT NULL,
            type TEXT NOT NULL,
            PRIMARY KEY (parent, child, type)
        );
        CREATE INDEX IF NOT EXISTS idx_links_child ON {LINKS_TABLE}(child);

        CREATE TABLE IF NOT EXISTS linked_parents (
            parent INTEGER PRIMARY KEY,
            linked_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS link_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT NOT NULL UNIQUE,
            tool_version TEXT NOT NULL,
            force_recheck INTEGER NOT NULL,
            started_at INTEGER NOT NULL,
            finished_at INTEGER,
            duration_ms INTEGER,
            outcome TEXT NOT NULL,
            entities_processed INTEGER DEFAULT 0,
            edges_inserted INTEGER DEFAULT 0,
            errors INTEGER DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_link_runs_started_at ON link_runs(started_at DESC);

        CREATE TABLE IF NOT EXISTS schema_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );"
    ))
    .map_err(|e| anyhow::anyhow!("Failed to create link tables: {}", e))?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (id, version) VALUES (1, ?1)",
        [FDLINK_SCHEMA_VERSION],
    )
    .map_err(|e| anyhow::anyhow!("Failed to record schema version: {}", e))?;

    Ok(())
}

/// Read the stored schema version
pub fn schema_version(conn: &rusqlite::Connection) -> Result<i64> {
    let version = conn
        .query_row("SELECT version FROM schema_meta WHERE id = 1", [], |row| {
            row.get(0)
        })
        .map_err(|e| anyhow::anyhow!("Failed to read schema version: {}", e))?;
    Ok(version)
}
