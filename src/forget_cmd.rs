//! Forget command implementation
//!
//! Drops a parent's edges and processed record so the next link run decodes
//! it again.

use anyhow::Result;
use fdlink::output::{generate_execution_id, output_json, ForgetResponse, JsonResponse};
use fdlink::{Fdid, LinkGraph, OutputFormat};
use std::path::PathBuf;

pub fn run_forget(db_path: PathBuf, fdid: Fdid, output_format: OutputFormat) -> Result<()> {
    let mut graph = LinkGraph::open(&db_path)?;
    let edges_removed = graph.forget_parent(fdid)?;

    match output_format {
        OutputFormat::Json | OutputFormat::Pretty => {
            let response = ForgetResponse {
                fdid,
                edges_removed,
            };
            let exec_id = generate_execution_id();
            output_json(&JsonResponse::new(response, &exec_id), output_format)?;
        }
        OutputFormat::Human => {
            println!("Forgot {}: removed {} edges", fdid, edges_removed);
        }
    }

    Ok(())
}
