//! Edge export
//!
//! Writes the full edge table as JSON, JSON Lines or CSV.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use super::{Edge, LinkGraph};

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Single JSON document
    Json,
    /// One edge per line
    JsonLines,
    /// `parent,child,type` with header row
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "jsonl" => Some(ExportFormat::JsonLines),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// What an export wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub edges: usize,
    pub parents: usize,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    version: &'static str,
    edges: &'a [Edge],
}

#[derive(Serialize)]
struct CsvRow<'a> {
    parent: u32,
    child: u32,
    #[serde(rename = "type")]
    kind: &'a str,
}

pub fn export_edges<W: Write>(
    graph: &LinkGraph,
    format: ExportFormat,
    mut out: W,
) -> Result<ExportSummary> {
    let edges = graph.all_edges()?;

    let mut parents = edges.iter().map(|e| e.parent).collect::<Vec<_>>();
    parents.dedup();
    let summary = ExportSummary {
        edges: edges.len(),
        parents: parents.len(),
    };

    match format {
        ExportFormat::Json => {
            let doc = JsonExport {
                version: env!("CARGO_PKG_VERSION"),
                edges: &edges,
            };
            serde_json::to_writer_pretty(&mut out, &doc)?;
            writeln!(out)?;
        }
        ExportFormat::JsonLines => {
            for edge in &edges {
                serde_json::to_writer(&mut out, edge)?;
                writeln!(out)?;
            }
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            for edge in &edges {
                writer.serialize(CsvRow {
                    parent: edge.parent,
                    child: edge.child,
                    kind: edge.kind.as_str(),
                })?;
            }
            writer.flush()?;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LinkKind;

    fn sample_graph() -> LinkGraph {
        let graph = LinkGraph::open_in_memory().unwrap();
        graph
            .insert_edge(&Edge::new(100, 5, LinkKind::ModelTexture))
            .unwrap();
        graph
            .insert_edge(&Edge::new(100, 9, LinkKind::ModelSkeleton))
            .unwrap();
        graph
            .insert_edge(&Edge::new(1, 50, LinkKind::RootTile))
            .unwrap();
        graph
    }

    #[test]
    fn test_export_csv() {
        let graph = sample_graph();
        let mut buf = Vec::new();
        let summary = export_edges(&graph, ExportFormat::Csv, &mut buf).unwrap();

        assert_eq!(summary, ExportSummary { edges: 3, parents: 2 });
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "parent,child,type");
        assert_eq!(lines[1], "1,50,root adt");
        assert_eq!(lines[2], "100,5,m2 texture");
        assert_eq!(lines[3], "100,9,m2 skel");
    }

    #[test]
    fn test_export_jsonl() {
        let graph = sample_graph();
        let mut buf = Vec::new();
        export_edges(&graph, ExportFormat::JsonLines, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let first: Edge = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first, Edge::new(1, 50, LinkKind::RootTile));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_export_json_document() {
        let graph = sample_graph();
        let mut buf = Vec::new();
        export_edges(&graph, ExportFormat::Json, &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["edges"].as_array().unwrap().len(), 3);
        assert_eq!(value["edges"][0]["kind"], "root adt");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::from_str("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_str("jsonl"), Some(ExportFormat::JsonLines));
        assert_eq!(ExportFormat::from_str("dot"), None);
    }
}
