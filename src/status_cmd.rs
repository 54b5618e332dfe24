//! Status command implementation for fdlink
//!
//! Reports edge and parent counts, per-label totals and the most recent run.

use anyhow::Result;
use fdlink::output::{generate_execution_id, output_json, JsonResponse, KindCount, StatusResponse};
use fdlink::{LinkGraph, OutputFormat};
use std::path::PathBuf;

/// Run status query command
///
/// Usage: fdlink status --db <FILE>
pub fn run_status(db_path: PathBuf, output_format: OutputFormat) -> Result<()> {
    let graph = LinkGraph::open(&db_path)?;

    let response = StatusResponse {
        db_schema_version: graph.schema_version()?,
        parents: graph.count_parents()?,
        edges: graph.count_edges()?,
        edges_by_type: graph
            .count_edges_by_kind()?
            .into_iter()
            .map(|(link_type, count)| KindCount { link_type, count })
            .collect(),
        last_run: graph.recent_runs(1)?.into_iter().next(),
    };

    match output_format {
        OutputFormat::Json | OutputFormat::Pretty => {
            let exec_id = generate_execution_id();
            output_json(&JsonResponse::new(response, &exec_id), output_format)?;
        }
        OutputFormat::Human => {
            println!("schema_version: {}", response.db_schema_version);
            println!("parents: {}", response.parents);
            println!("edges: {}", response.edges);
            for kind in &response.edges_by_type {
                println!("  {}: {}", kind.link_type, kind.count);
            }
            match &response.last_run {
                Some(run) => println!(
                    "last_run: {} {} ({} entities, {} edges, {} errors)",
                    run.run_id, run.outcome, run.entities_processed, run.edges_inserted, run.errors
                ),
                None => println!("last_run: none"),
            }
        }
    }

    Ok(())
}
