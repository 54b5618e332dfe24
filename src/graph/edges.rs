//! Edge store operations
//!
//! Stateless functions over a `rusqlite::Connection`. Every call takes its
//! parameters by value, so the same functions work on a plain connection, a
//! transaction or a savepoint (all deref to `Connection`).

use ahash::AHashSet;
use rusqlite::{ffi, params, Connection};

use super::schema::{Edge, Fdid, LinkKind, LinkedFile, LINKS_TABLE};

/// Result of a single edge insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The (parent, child, kind) triple already existed
    Duplicate,
    /// Child was the zero sentinel; nothing written
    ZeroChild,
}

/// Insert one edge.
///
/// Unique-constraint violations are reported as `Duplicate`, every other
/// SQLite failure is returned as an error.
pub fn insert_edge(conn: &Connection, edge: &Edge) -> rusqlite::Result<InsertOutcome> {
    if edge.child == 0 {
        return Ok(InsertOutcome::ZeroChild);
    }

    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO {LINKS_TABLE} (parent, child, type) VALUES (?1, ?2, ?3)"
    ))?;

    match stmt.execute(params![edge.parent, edge.child, edge.kind.as_str()]) {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(rusqlite::Error::SqliteFailure(err, _)) if is_duplicate_key(err.extended_code) => {
            Ok(InsertOutcome::Duplicate)
        }
        Err(e) => Err(e),
    }
}

/// Primary-key or unique violations only; CHECK, NOT NULL and trigger
/// aborts are real failures
fn is_duplicate_key(extended_code: std::os::raw::c_int) -> bool {
    matches!(
        extended_code,
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Delete every edge whose parent is `parent`, returning the number removed
pub fn delete_edges_for_parent(conn: &Connection, parent: Fdid) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(&format!("DELETE FROM {LINKS_TABLE} WHERE parent = ?1"))?;
    stmt.execute(params![parent])
}

/// Record that `parent` was processed, even if it produced no edges
pub fn mark_parent_linked(conn: &Connection, parent: Fdid) -> rusqlite::Result<()> {
    let linked_at = chrono::Utc::now().timestamp();
    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO linked_parents (parent, linked_at) VALUES (?1, ?2)",
    )?;
    stmt.execute(params![parent, linked_at])?;
    Ok(())
}

/// Forget the processed marker for `parent`
pub fn unmark_parent(conn: &Connection, parent: Fdid) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached("DELETE FROM linked_parents WHERE parent = ?1")?;
    stmt.execute(params![parent])?;
    Ok(())
}

/// All parents known to the store: edge parents plus explicitly recorded ones
pub fn list_all_parents(conn: &Connection) -> rusqlite::Result<AHashSet<Fdid>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT parent FROM {LINKS_TABLE} UNION SELECT parent FROM linked_parents"
    ))?;
    let rows = stmt.query_map([], |row| row.get::<_, Fdid>(0))?;

    let mut parents = AHashSet::new();
    for row in rows {
        parents.insert(row?);
    }
    Ok(parents)
}

/// Outgoing references of `parent`, in insertion order
pub fn edges_for_parent(conn: &Connection, parent: Fdid) -> rusqlite::Result<Vec<LinkedFile>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT child, type FROM {LINKS_TABLE} WHERE parent = ?1 ORDER BY rowid"
    ))?;
    let rows = stmt.query_map(params![parent], |row| {
        Ok(LinkedFile {
            file_data_id: row.get(0)?,
            link_type: LinkKind::from_label(&row.get::<_, String>(1)?),
        })
    })?;
    rows.collect()
}

/// Incoming references of `child`: every edge that points at it
pub fn referrers_of(conn: &Connection, child: Fdid) -> rusqlite::Result<Vec<Edge>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT parent, child, type FROM {LINKS_TABLE} WHERE child = ?1 ORDER BY parent, rowid"
    ))?;
    let rows = stmt.query_map(params![child], row_to_edge)?;
    rows.collect()
}

/// Every edge in the store, ordered by parent then insertion
pub fn all_edges(conn: &Connection) -> rusqlite::Result<Vec<Edge>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT parent, child, type FROM {LINKS_TABLE} ORDER BY parent, rowid"
    ))?;
    let rows = stmt.query_map([], row_to_edge)?;
    rows.collect()
}

pub fn count_edges(conn: &Connection) -> rusqlite::Result<usize> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {LINKS_TABLE}"), [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as usize)
}

pub fn count_parents(conn: &Connection) -> rusqlite::Result<usize> {
    conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM (SELECT parent FROM {LINKS_TABLE} UNION SELECT parent FROM linked_parents)"
        ),
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as usize)
}

/// Edge counts grouped by label, sorted by label
pub fn count_edges_by_kind(conn: &Connection) -> rusqlite::Result<Vec<(LinkKind, usize)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT type, COUNT(*) FROM {LINKS_TABLE} GROUP BY type ORDER BY type"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok((
            LinkKind::from_label(&row.get::<_, String>(0)?),
            row.get::<_, i64>(1)? as usize,
        ))
    })?;
    rows.collect()
}

fn row_to_edge(row: &rusqlite::Row) -> rusqlite::Result<Edge> {
    Ok(Edge {
        parent: row.get(0)?,
        child: row.get(1)?,
        kind: LinkKind::from_label(&row.get::<_, String>(2)?),
    })
}
