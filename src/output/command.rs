//! JSON output types for CLI commands
//!
//! Every JSON response is wrapped in [`JsonResponse`], which carries the
//! schema version and an execution id so scripted consumers can detect format
//! changes and correlate output with logs.

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Fdid, LinkKind, RunRecord};

/// Current JSON output schema version
pub const FDLINK_JSON_SCHEMA_VERSION: &str = "1.0.0";

/// Wrapper for all JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    /// Schema version for parsing stability
    pub schema_version: String,
    /// Unique execution ID for this run
    pub execution_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// RFC 3339, seconds precision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Response data
    pub data: T,
}

impl<T> JsonResponse<T> {
    pub fn new(data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: FDLINK_JSON_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            tool: Some("fdlink".to_string()),
            timestamp: Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            data,
        }
    }
}

/// Edge count for one link label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindCount {
    pub link_type: LinkKind,
    pub count: usize,
}

/// Response for status command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub db_schema_version: i64,
    /// Parents with edges or a processed record
    pub parents: usize,
    pub edges: usize,
    pub edges_by_type: Vec<KindCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<RunRecord>,
}

/// One edge in a refs listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefMatch {
    pub parent: Fdid,
    pub child: Fdid,
    pub link_type: LinkKind,
}

impl From<Edge> for RefMatch {
    fn from(edge: Edge) -> Self {
        RefMatch {
            parent: edge.parent,
            child: edge.child,
            link_type: edge.kind,
        }
    }
}

/// Response for refs command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefsResponse {
    pub fdid: Fdid,
    /// "out" for what the file references, "in" for what references it
    pub direction: String,
    pub references: Vec<RefMatch>,
}

/// Response for forget command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgetResponse {
    pub fdid: Fdid,
    pub edges_removed: usize,
}

/// Response for errors in JSON mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code (FDL-*)
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Human,
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            "pretty" => Some(OutputFormat::Pretty),
            _ => None,
        }
    }
}

/// Generate a unique execution ID for this run
///
/// Uses timestamp + process ID for uniqueness.
pub fn generate_execution_id() -> String {
    let timestamp = chrono::Utc::now().timestamp();
    format!("{:x}-{:x}", timestamp, std::process::id())
}

/// Output JSON to stdout
pub fn output_json<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    let json = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(data)?,
        OutputFormat::Json | OutputFormat::Human => serde_json::to_string(data)?,
    };
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_id_format() {
        let id = generate_execution_id();

        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 2, "Execution ID should have 2 parts: {}", id);
        assert!(u64::from_str_radix(parts[0], 16).is_ok());
        assert!(u64::from_str_radix(parts[1], 16).is_ok());
    }

    #[test]
    fn test_json_response_serialization() {
        let response = JsonResponse::new(
            RefsResponse {
                fdid: 100,
                direction: "out".to_string(),
                references: vec![RefMatch::from(Edge::new(100, 5, LinkKind::ModelTexture))],
            },
            "test-exec-123",
        );

        let json = serde_json::to_string(&response).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["schema_version"], FDLINK_JSON_SCHEMA_VERSION);
        assert_eq!(parsed["execution_id"], "test-exec-123");
        assert_eq!(parsed["tool"], "fdlink");
        assert_eq!(parsed["data"]["references"][0]["link_type"], "m2 texture");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("pretty"), Some(OutputFormat::Pretty));
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::from_str("yaml"), None);
    }

    #[test]
    fn test_status_response_omits_missing_run() {
        let response = StatusResponse {
            db_schema_version: 2,
            parents: 1,
            edges: 3,
            edges_by_type: vec![KindCount {
                link_type: LinkKind::RootTile,
                count: 3,
            }],
            last_run: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["edges_by_type"][0]["link_type"], "root adt");
        assert!(json.get("last_run").is_none());
    }
}
