//! Link diagnostics for structured skip reasons and error reporting.
//!
//! - Structured types for skip reasons and per-entity errors
//! - Deterministic ordering via sort_key()
//! - Human-readable stderr output
//! - JSON serialization for `--output json`

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::archive::AssetKind;
use crate::graph::Fdid;

/// Reason why an entity (or part of one) produced no edges.
///
/// None of these are failures: the entity is still recorded as processed
/// unless the reason says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// FDID has no content in this build
    NotInArchive,
    /// World definition has no listfile name
    NoFilename,
    /// World definition is an auxiliary file (_lgt, _occ, ...)
    AuxiliaryWorldFile,
    /// Kind is only reached through a parent (terrain tiles) or unknown
    NotLinkable,
    /// Terrain tile names its models inline; placements were not linked
    LegacyFilenames,
}

impl SkipReason {
    /// Stable sort key for deterministic ordering.
    pub fn sort_key(&self) -> u8 {
        match self {
            SkipReason::NotInArchive => 0,
            SkipReason::NoFilename => 1,
            SkipReason::AuxiliaryWorldFile => 2,
            SkipReason::LegacyFilenames => 3,
            SkipReason::NotLinkable => 4,
        }
    }

    /// Human-readable description for stderr output.
    pub fn description(&self) -> &'static str {
        match self {
            SkipReason::NotInArchive => "not in archive",
            SkipReason::NoFilename => "no listfile name",
            SkipReason::AuxiliaryWorldFile => "auxiliary world file",
            SkipReason::NotLinkable => "kind is not linkable",
            SkipReason::LegacyFilenames => "legacy model filenames, placements not linked",
        }
    }

    /// Whether the FDID still counts as processed.
    ///
    /// Missing content is not remembered: a later build may add the file.
    pub fn marks_processed(&self) -> bool {
        match self {
            SkipReason::NotInArchive | SkipReason::NoFilename | SkipReason::NotLinkable => false,
            SkipReason::AuxiliaryWorldFile | SkipReason::LegacyFilenames => true,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl PartialOrd for SkipReason {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SkipReason {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Stage of linking where an error occurred.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStage {
    /// Content lookup failed
    Read,
    DecodeModel,
    DecodeContainer,
    DecodeWorld,
    DecodeTile,
    /// Writing edges or the parent record
    Store,
    Other,
}

impl DiagnosticStage {
    pub fn sort_key(&self) -> u8 {
        match self {
            DiagnosticStage::Read => 0,
            DiagnosticStage::DecodeModel => 1,
            DiagnosticStage::DecodeContainer => 2,
            DiagnosticStage::DecodeWorld => 3,
            DiagnosticStage::DecodeTile => 4,
            DiagnosticStage::Store => 5,
            DiagnosticStage::Other => 6,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticStage::Read => "reading file",
            DiagnosticStage::DecodeModel => "decoding M2",
            DiagnosticStage::DecodeContainer => "decoding WMO",
            DiagnosticStage::DecodeWorld => "decoding WDT",
            DiagnosticStage::DecodeTile => "decoding ADT",
            DiagnosticStage::Store => "writing edges",
            DiagnosticStage::Other => "linking",
        }
    }

    /// Decode stage for an asset kind
    pub fn decode(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Model => DiagnosticStage::DecodeModel,
            AssetKind::ModelContainer | AssetKind::ContainerGroup => {
                DiagnosticStage::DecodeContainer
            }
            AssetKind::WorldDefinition => DiagnosticStage::DecodeWorld,
            AssetKind::TerrainTile => DiagnosticStage::DecodeTile,
            AssetKind::Unknown => DiagnosticStage::Other,
        }
    }
}

impl fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl PartialOrd for DiagnosticStage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiagnosticStage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// A diagnostic event from a link run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkDiagnostic {
    /// A whole kind pass was skipped because types were never detected
    Unclassified { kind: AssetKind },
    /// Entity (or one of its tiles) was skipped
    Skipped { fdid: Fdid, reason: SkipReason },
    /// Entity failed; it produced no edges and will be retried next run
    Error {
        fdid: Fdid,
        stage: DiagnosticStage,
        message: String,
    },
}

impl LinkDiagnostic {
    /// FDID the diagnostic is about, 0 for pass-level events
    pub fn fdid(&self) -> Fdid {
        match self {
            LinkDiagnostic::Unclassified { .. } => 0,
            LinkDiagnostic::Skipped { fdid, .. } => *fdid,
            LinkDiagnostic::Error { fdid, .. } => *fdid,
        }
    }

    /// Stable sort key for deterministic ordering.
    ///
    /// Primary: pass-level events first
    /// Secondary: FDID
    /// Tertiary: variant (Error before Skipped), then stage/reason
    pub fn sort_key(&self) -> (u8, Fdid, u8, u8) {
        match self {
            LinkDiagnostic::Unclassified { kind } => (0, 0, 0, *kind as u8),
            LinkDiagnostic::Error { fdid, stage, .. } => (1, *fdid, 0, stage.sort_key()),
            LinkDiagnostic::Skipped { fdid, reason } => (1, *fdid, 1, reason.sort_key()),
        }
    }

    pub fn unclassified(kind: AssetKind) -> Self {
        LinkDiagnostic::Unclassified { kind }
    }

    pub fn skipped(fdid: Fdid, reason: SkipReason) -> Self {
        LinkDiagnostic::Skipped { fdid, reason }
    }

    pub fn error(fdid: Fdid, stage: DiagnosticStage, message: String) -> Self {
        LinkDiagnostic::Error {
            fdid,
            stage,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LinkDiagnostic::Error { .. })
    }

    /// Format for human-readable stderr output.
    ///
    /// Examples:
    /// - "SKIP 1234: not in archive"
    /// - "ERROR 1234: decoding M2: truncated header"
    /// - "SKIP wdt: types not detected"
    pub fn format_stderr(&self) -> String {
        match self {
            LinkDiagnostic::Unclassified { kind } => {
                format!("SKIP {}: types not detected", kind)
            }
            LinkDiagnostic::Skipped { fdid, reason } => {
                format!("SKIP {}: {}", fdid, reason)
            }
            LinkDiagnostic::Error {
                fdid,
                stage,
                message,
            } => {
                format!("ERROR {}: {}: {}", fdid, stage, message)
            }
        }
    }
}

impl fmt::Display for LinkDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_stderr())
    }
}

impl PartialOrd for LinkDiagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LinkDiagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_ord() {
        assert!(SkipReason::NotInArchive < SkipReason::NoFilename);
        assert!(SkipReason::AuxiliaryWorldFile < SkipReason::NotLinkable);
    }

    #[test]
    fn test_missing_content_is_not_remembered() {
        assert!(!SkipReason::NotInArchive.marks_processed());
        assert!(!SkipReason::NoFilename.marks_processed());
        assert!(SkipReason::AuxiliaryWorldFile.marks_processed());
    }

    #[test]
    fn test_decode_stage_per_kind() {
        assert_eq!(
            DiagnosticStage::decode(AssetKind::Model),
            DiagnosticStage::DecodeModel
        );
        assert_eq!(
            DiagnosticStage::decode(AssetKind::ContainerGroup),
            DiagnosticStage::DecodeContainer
        );
        assert!(DiagnosticStage::Read < DiagnosticStage::Store);
    }

    #[test]
    fn test_sort_key_same_fdid() {
        let error = LinkDiagnostic::error(7, DiagnosticStage::DecodeTile, "x".to_string());
        let skipped = LinkDiagnostic::skipped(7, SkipReason::LegacyFilenames);

        assert_eq!(error.sort_key().1, skipped.sort_key().1);
        assert!(error < skipped);
    }

    #[test]
    fn test_sorting_vec() {
        let mut diagnostics = vec![
            LinkDiagnostic::skipped(30, SkipReason::NotInArchive),
            LinkDiagnostic::error(10, DiagnosticStage::Read, "gone".to_string()),
            LinkDiagnostic::unclassified(AssetKind::WorldDefinition),
            LinkDiagnostic::skipped(20, SkipReason::NoFilename),
        ];

        diagnostics.sort();

        assert!(matches!(diagnostics[0], LinkDiagnostic::Unclassified { .. }));
        assert_eq!(diagnostics[1].fdid(), 10);
        assert_eq!(diagnostics[2].fdid(), 20);
        assert_eq!(diagnostics[3].fdid(), 30);
    }

    #[test]
    fn test_format_stderr() {
        assert_eq!(
            LinkDiagnostic::skipped(1234, SkipReason::NotInArchive).format_stderr(),
            "SKIP 1234: not in archive"
        );
        assert_eq!(
            LinkDiagnostic::error(
                1234,
                DiagnosticStage::DecodeModel,
                "truncated header".to_string()
            )
            .format_stderr(),
            "ERROR 1234: decoding M2: truncated header"
        );
        assert_eq!(
            LinkDiagnostic::unclassified(AssetKind::WorldDefinition).to_string(),
            "SKIP wdt: types not detected"
        );
    }

    #[test]
    fn test_json_shape() {
        let diag = LinkDiagnostic::skipped(5, SkipReason::AuxiliaryWorldFile);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["type"], "skipped");
        assert_eq!(json["fdid"], 5);
        assert_eq!(json["reason"], "auxiliary_world_file");
    }
}
