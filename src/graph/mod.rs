//! Edge persistence layer using SQLite
pub mod edges;
pub mod export;
mod parents;
pub mod run_log;
pub mod schema;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub use edges::InsertOutcome;
pub use export::{ExportFormat, ExportSummary};
pub use parents::ParentIndex;
pub use run_log::RunRecord;
pub use schema::{Edge, Fdid, LinkKind, LinkedFile, FDLINK_SCHEMA_VERSION};

/// Link database wrapper
///
/// Owns the single writer connection. All linking writes go through
/// transactions obtained from [`LinkGraph::connection_mut`]; the read path
/// methods below work on the committed state.
pub struct LinkGraph {
    conn: Connection,
}

impl LinkGraph {
    /// Open a link database at the given path
    ///
    /// # Arguments
    /// * `db_path` - Path to the database file (created if not exists),
    ///   or `:memory:`
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| anyhow::anyhow!("Failed to open link database: {}", e))?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Build an existing-parent index from the current store contents
    pub fn load_parent_index(&self) -> Result<ParentIndex> {
        let parents = edges::list_all_parents(&self.conn)
            .map_err(|e| anyhow::anyhow!("Failed to load existing parents: {}", e))?;
        Ok(ParentIndex::from_set(parents))
    }

    /// Insert a single edge outside any linking run
    pub fn insert_edge(&self, edge: &Edge) -> Result<InsertOutcome> {
        Ok(edges::insert_edge(&self.conn, edge)?)
    }

    /// What does `parent` reference, in insertion order
    pub fn edges_for_parent(&self, parent: Fdid) -> Result<Vec<LinkedFile>> {
        Ok(edges::edges_for_parent(&self.conn, parent)?)
    }

    /// What references `child`
    pub fn referrers_of(&self, child: Fdid) -> Result<Vec<Edge>> {
        Ok(edges::referrers_of(&self.conn, child)?)
    }

    /// Delete a parent's edges and processed marker in one transaction.
    ///
    /// Returns the number of edges removed.
    pub fn forget_parent(&mut self, parent: Fdid) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = edges::delete_edges_for_parent(&tx, parent)?;
        edges::unmark_parent(&tx, parent)?;
        tx.commit()?;
        Ok(removed)
    }

    pub fn all_edges(&self) -> Result<Vec<Edge>> {
        Ok(edges::all_edges(&self.conn)?)
    }

    pub fn count_edges(&self) -> Result<usize> {
        Ok(edges::count_edges(&self.conn)?)
    }

    pub fn count_parents(&self) -> Result<usize> {
        Ok(edges::count_parents(&self.conn)?)
    }

    pub fn count_edges_by_kind(&self) -> Result<Vec<(LinkKind, usize)>> {
        Ok(edges::count_edges_by_kind(&self.conn)?)
    }

    pub fn schema_version(&self) -> Result<i64> {
        schema::schema_version(&self.conn)
    }

    /// Most recent link runs first
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>> {
        run_log::list_runs(&self.conn, Some(limit))
    }

    /// Write all edges in the requested format
    pub fn export<W: std::io::Write>(&self, format: ExportFormat, out: W) -> Result<ExportSummary> {
        export::export_edges(self, format, out)
    }
}
