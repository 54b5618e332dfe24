//! Run log for `link_all` passes
//!
//! Records every full linking run with run_id, timestamps, force flag and
//! outcome counts. Provides an audit trail for long, resumed runs.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// One row of `link_runs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: i64,
    pub run_id: String,
    pub tool_version: String,
    pub force_recheck: bool,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub duration_ms: Option<i64>,
    pub outcome: String, // "running", "success", "partial", "interrupted"
    pub entities_processed: i64,
    pub edges_inserted: i64,
    pub errors: i64,
}

/// Generate a run id from the current time and process id
pub fn generate_run_id() -> String {
    let now = chrono::Utc::now();
    format!(
        "{:x}-{:x}-{:x}",
        now.timestamp(),
        now.timestamp_subsec_micros(),
        std::process::id()
    )
}

pub fn start_run(conn: &Connection, run_id: &str, force_recheck: bool) -> Result<i64> {
    let started_at = chrono::Utc::now().timestamp_millis();

    conn.execute(
        "INSERT INTO link_runs (run_id, tool_version, force_recheck, started_at, outcome)
            VALUES (?1, ?2, ?3, ?4, 'running')",
        params![
            run_id,
            env!("CARGO_PKG_VERSION"),
            force_recheck,
            started_at
        ],
    )
    .map_err(|e| anyhow::anyhow!("Failed to insert link run: {}", e))?;

    Ok(conn.last_insert_rowid())
}

pub fn finish_run(
    conn: &Connection,
    run_id: &str,
    outcome: &str,
    entities_processed: usize,
    edges_inserted: usize,
    errors: usize,
) -> Result<()> {
    let finished_at = chrono::Utc::now().timestamp_millis();

    let started_at: i64 = conn
        .query_row(
            "SELECT started_at FROM link_runs WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )
        .map_err(|e| anyhow::anyhow!("Unknown link run {}: {}", run_id, e))?;

    conn.execute(
        "UPDATE link_runs
            SET finished_at = ?1, duration_ms = ?2, outcome = ?3,
                entities_processed = ?4, edges_inserted = ?5, errors = ?6
            WHERE run_id = ?7",
        params![
            finished_at,
            finished_at - started_at,
            outcome,
            entities_processed as i64,
            edges_inserted as i64,
            errors as i64,
            run_id
        ],
    )
    .map_err(|e| anyhow::anyhow!("Failed to finish link run: {}", e))?;

    Ok(())
}

pub fn get_run(conn: &Connection, run_id: &str) -> Result<Option<RunRecord>> {
    let record = conn
        .query_row(
            "SELECT id, run_id, tool_version, force_recheck, started_at, finished_at,
                    duration_ms, outcome, entities_processed, edges_inserted, errors
             FROM link_runs WHERE run_id = ?1",
            params![run_id],
            row_to_record,
        )
        .optional()?;
    Ok(record)
}

/// Most recent runs first
pub fn list_runs(conn: &Connection, limit: Option<usize>) -> Result<Vec<RunRecord>> {
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(
        "SELECT id, run_id, tool_version, force_recheck, started_at, finished_at,
                duration_ms, outcome, entities_processed, edges_inserted, errors
         FROM link_runs ORDER BY started_at DESC, id DESC LIMIT ?1",
    )?;
    let records = stmt
        .query_map(params![limit], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        run_id: row.get(1)?,
        tool_version: row.get(2)?,
        force_recheck: row.get(3)?,
        started_at: row.get(4)?,
        finished_at: row.get(5)?,
        duration_ms: row.get(6)?,
        outcome: row.get(7)?,
        entities_processed: row.get(8)?,
        edges_inserted: row.get(9)?,
        errors: row.get(10)?,
    })
}
