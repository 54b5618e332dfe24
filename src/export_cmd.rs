//! Export command implementation

use anyhow::{Context, Result};
use fdlink::{ExportFormat, LinkGraph};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Write every edge to `file`, or stdout when no file is given.
///
/// Usage: fdlink export --db <FILE> [--format json|jsonl|csv] [--file <PATH>]
pub fn run_export(db_path: PathBuf, format: ExportFormat, file: Option<PathBuf>) -> Result<()> {
    let graph = LinkGraph::open(&db_path)?;

    match file {
        Some(path) => {
            let out = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(out);
            let summary = graph.export(format, &mut out)?;
            out.flush()?;
            eprintln!(
                "Exported {} edges from {} parents to {}",
                summary.edges,
                summary.parents,
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            graph.export(format, stdout.lock())?;
        }
    }

    Ok(())
}
