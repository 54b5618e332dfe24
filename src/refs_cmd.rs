//! Refs command implementation
//!
//! `out` lists what a file references; `in` lists what references it.

use anyhow::Result;
use fdlink::output::{generate_execution_id, output_json, JsonResponse, RefMatch, RefsResponse};
use fdlink::{Edge, Fdid, LinkGraph, OutputFormat};
use std::path::PathBuf;

use crate::cli::RefsDirection;

pub fn run_refs(
    db_path: PathBuf,
    fdid: Fdid,
    direction: RefsDirection,
    output_format: OutputFormat,
) -> Result<()> {
    let graph = LinkGraph::open(&db_path)?;

    let references: Vec<RefMatch> = match direction {
        RefsDirection::Out => graph
            .edges_for_parent(fdid)?
            .into_iter()
            .map(|linked| RefMatch::from(Edge::new(fdid, linked.file_data_id, linked.link_type)))
            .collect(),
        RefsDirection::In => graph
            .referrers_of(fdid)?
            .into_iter()
            .map(RefMatch::from)
            .collect(),
    };

    match output_format {
        OutputFormat::Json | OutputFormat::Pretty => {
            let response = RefsResponse {
                fdid,
                direction: direction.as_str().to_string(),
                references,
            };
            let exec_id = generate_execution_id();
            output_json(&JsonResponse::new(response, &exec_id), output_format)?;
        }
        OutputFormat::Human => {
            if references.is_empty() {
                match direction {
                    RefsDirection::Out => println!("{} references no files", fdid),
                    RefsDirection::In => println!("{} is not referenced", fdid),
                }
                return Ok(());
            }

            match direction {
                RefsDirection::Out => {
                    println!("{} references {} file(s):", fdid, references.len());
                    for r in &references {
                        println!("  {}  {}", r.child, r.link_type);
                    }
                }
                RefsDirection::In => {
                    println!("{} is referenced by {} file(s):", fdid, references.len());
                    for r in &references {
                        println!("  {}  {}", r.parent, r.link_type);
                    }
                }
            }
        }
    }

    Ok(())
}
