//! Link orchestrator
//!
//! Walks the archive's type index kind by kind and turns each FDID into edges.
//!
//! # Write discipline
//!
//! There is one writer: the connection owned by [`LinkGraph`]. FDIDs are
//! processed in chunks of [`LinkConfig::batch_size`]:
//!
//! 1. Entities already in the [`ParentIndex`] are skipped (unless forced).
//! 2. The remaining entities are extracted, on the rayon pool when
//!    [`LinkConfig::parallel`] is set. Extraction only reads.
//! 3. Results are applied in input order inside one transaction, one savepoint
//!    per entity. A store failure rolls back that entity only.
//! 4. The transaction commits, then the index learns the new parents.
//!
//! An interrupted run is resumed by running again: committed chunks are in
//! the index and are skipped.

use anyhow::Result;
use rayon::prelude::*;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::archive::{Archive, AssetKind};
use crate::diagnostics::{LinkDiagnostic, SkipReason};
use crate::error::LinkError;
use crate::extract::{self, ExtractContext, Extracted, Extraction};
use crate::formats::Readers;
use crate::graph::{edges, run_log, Fdid, InsertOutcome, LinkGraph, ParentIndex};

/// Progress callback: (kind, done, total) for the current pass
pub type LinkProgress<'a> = dyn Fn(AssetKind, usize, usize) + Send + Sync + 'a;

/// Linker configuration
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Entities per transaction
    pub batch_size: usize,
    /// Extract each chunk on the rayon pool
    pub parallel: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            parallel: true,
        }
    }
}

/// What happened to one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Extracted and written; `edges` counts newly inserted rows
    Linked { edges: usize },
    /// Already a known parent and not forced; nothing decoded
    AlreadyLinked,
    Skipped(SkipReason),
    /// Re-tagged to the given kind; nothing written
    Reclassified(AssetKind),
    /// Extraction or storage failed; the entity will be retried next run
    Failed(LinkDiagnostic),
}

/// Per-kind totals for one `link_all` pass
#[derive(Debug, Clone, Serialize)]
pub struct KindSummary {
    pub kind: AssetKind,
    pub total: usize,
    pub linked: usize,
    pub already_linked: usize,
    pub skipped: usize,
    pub reclassified: usize,
    pub failed: usize,
    pub edges_inserted: usize,
}

impl KindSummary {
    fn new(kind: AssetKind, total: usize) -> Self {
        Self {
            kind,
            total,
            linked: 0,
            already_linked: 0,
            skipped: 0,
            reclassified: 0,
            failed: 0,
            edges_inserted: 0,
        }
    }

    fn record(&mut self, outcome: &LinkOutcome) {
        match outcome {
            LinkOutcome::Linked { edges } => {
                self.linked += 1;
                self.edges_inserted += edges;
            }
            LinkOutcome::AlreadyLinked => self.already_linked += 1,
            LinkOutcome::Skipped(_) => self.skipped += 1,
            LinkOutcome::Reclassified(_) => self.reclassified += 1,
            LinkOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Entities that went through an extractor
    pub fn processed(&self) -> usize {
        self.linked + self.skipped + self.reclassified + self.failed
    }
}

/// Result of a `link_all` run
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub run_id: String,
    pub force_recheck: bool,
    pub passes: Vec<KindSummary>,
    /// Sorted by [`LinkDiagnostic::sort_key`]
    pub diagnostics: Vec<LinkDiagnostic>,
    pub interrupted: bool,
}

impl LinkReport {
    pub fn pass(&self, kind: AssetKind) -> Option<&KindSummary> {
        self.passes.iter().find(|p| p.kind == kind)
    }

    pub fn edges_inserted(&self) -> usize {
        self.passes.iter().map(|p| p.edges_inserted).sum()
    }

    pub fn entities_processed(&self) -> usize {
        self.passes.iter().map(KindSummary::processed).sum()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Run log outcome label
    pub fn outcome(&self) -> &'static str {
        if self.interrupted {
            "interrupted"
        } else if self.error_count() > 0 {
            "partial"
        } else {
            "success"
        }
    }
}

/// Links archive entities into a [`LinkGraph`].
pub struct Linker {
    graph: LinkGraph,
    archive: Arc<dyn Archive>,
    readers: Readers,
    parents: ParentIndex,
    config: LinkConfig,
    shutdown: Option<Arc<AtomicBool>>,
    diagnostics: Vec<LinkDiagnostic>,
}

impl Linker {
    /// Create a linker over an open graph.
    ///
    /// Loads the existing-parent index from the store.
    pub fn new(graph: LinkGraph, archive: Arc<dyn Archive>, readers: Readers) -> Result<Self> {
        let parents = graph.load_parent_index()?;
        Ok(Self {
            graph,
            archive,
            readers,
            parents,
            config: LinkConfig::default(),
            shutdown: None,
            diagnostics: Vec::new(),
        })
    }

    /// Open (or create) the link database at `db_path` and create a linker
    pub fn open<P: AsRef<Path>>(
        db_path: P,
        archive: Arc<dyn Archive>,
        readers: Readers,
    ) -> Result<Self> {
        Self::new(LinkGraph::open(db_path)?, archive, readers)
    }

    pub fn with_config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    /// Stop `link_all` at the next chunk boundary once `flag` is set
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    pub fn into_graph(self) -> LinkGraph {
        self.graph
    }

    pub fn parents(&self) -> &ParentIndex {
        &self.parents
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Diagnostics collected since the last call
    pub fn take_diagnostics(&mut self) -> Vec<LinkDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Link a single entity in its own transaction.
    ///
    /// # Behavior
    /// - Terrain tiles, group WMOs and unknown kinds: `Skipped(NotLinkable)`
    /// - Known parent and not forced: `AlreadyLinked`, no decode, no writes
    /// - Forced: existing edges and parent record are dropped first
    pub fn link_one(&mut self, kind: AssetKind, fdid: Fdid, force: bool) -> Result<LinkOutcome> {
        if !kind.is_linkable() {
            return Ok(LinkOutcome::Skipped(SkipReason::NotLinkable));
        }
        let mut outcomes = self.link_chunk(kind, &[fdid], force)?;
        Ok(outcomes.pop().unwrap_or(LinkOutcome::AlreadyLinked))
    }

    /// Link every model, then every root WMO, then every WDT.
    ///
    /// # Arguments
    /// * `force` - Re-extract entities that are already linked
    /// * `progress` - Optional callback, called after each committed chunk
    ///
    /// # Errors
    /// Only store-level failures (begin/commit, run log) abort the run.
    /// Per-entity failures end up in [`LinkReport::diagnostics`].
    pub fn link_all(&mut self, force: bool, progress: Option<&LinkProgress<'_>>) -> Result<LinkReport> {
        let run_id = run_log::generate_run_id();
        run_log::start_run(self.graph.connection(), &run_id, force)?;

        let mut report = LinkReport {
            run_id,
            force_recheck: force,
            passes: Vec::new(),
            diagnostics: Vec::new(),
            interrupted: false,
        };
        let batch_size = self.config.batch_size.max(1);

        for kind in AssetKind::LINKABLE {
            if report.interrupted {
                break;
            }

            let Some(fdids) = self.archive.type_index(kind) else {
                self.diagnostics
                    .push(LinkError::ClassificationMissing(kind).to_diagnostic());
                continue;
            };

            let total = fdids.len();
            let mut summary = KindSummary::new(kind, total);
            let mut done = 0;

            for chunk in fdids.chunks(batch_size) {
                if self.shutdown_requested() {
                    report.interrupted = true;
                    break;
                }

                for outcome in self.link_chunk(kind, chunk, force)? {
                    summary.record(&outcome);
                }

                done += chunk.len();
                if let Some(cb) = progress {
                    cb(kind, done, total);
                }
            }

            report.passes.push(summary);
        }

        report.diagnostics = self.take_diagnostics();
        report.diagnostics.sort();

        run_log::finish_run(
            self.graph.connection(),
            &report.run_id,
            report.outcome(),
            report.entities_processed(),
            report.edges_inserted(),
            report.error_count(),
        )?;

        Ok(report)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Extract and apply one chunk in a single transaction
    fn link_chunk(&mut self, kind: AssetKind, chunk: &[Fdid], force: bool) -> Result<Vec<LinkOutcome>> {
        let mut outcomes: Vec<Option<LinkOutcome>> = Vec::with_capacity(chunk.len());
        let mut pending: Vec<(usize, Fdid)> = Vec::new();

        for (slot, &fdid) in chunk.iter().enumerate() {
            if !force && self.parents.contains(fdid) {
                outcomes.push(Some(LinkOutcome::AlreadyLinked));
                continue;
            }
            outcomes.push(None);
            pending.push((slot, fdid));
        }

        let ctx = ExtractContext {
            archive: self.archive.as_ref(),
            readers: &self.readers,
            parents: &self.parents,
            force,
        };
        let results: Vec<Result<Extracted, LinkError>> = if self.config.parallel && pending.len() > 1 {
            pending
                .par_iter()
                .map(|&(_, fdid)| extract::extract(ctx, kind, fdid))
                .collect()
        } else {
            pending
                .iter()
                .map(|&(_, fdid)| extract::extract(ctx, kind, fdid))
                .collect()
        };

        let mut newly_linked = Vec::new();
        let mut forgotten = Vec::new();
        let mut retags = Vec::new();
        {
            let archive = self.archive.as_ref();
            let conn = self.graph.connection_mut();
            let mut tx = conn
                .transaction()
                .map_err(|e| anyhow::anyhow!("Failed to begin link transaction: {}", e))?;

            for ((slot, fdid), result) in pending.into_iter().zip(results) {
                let applied = apply_entity(&mut tx, fdid, result, force);
                self.diagnostics.extend(applied.diagnostics);
                newly_linked.extend(applied.linked);
                if applied.forgotten {
                    forgotten.push(fdid);
                }
                retags.extend(applied.retags);
                outcomes[slot] = Some(applied.outcome);
            }

            tx.commit()
                .map_err(|e| anyhow::anyhow!("Failed to commit link transaction: {}", e))?;

            for (fdid, kind) in retags {
                archive.set_detected_kind(fdid, kind);
            }
        }

        // Forced entities leave the index only once their delete has committed
        for fdid in forgotten {
            self.parents.remove(fdid);
        }
        self.parents.extend(newly_linked);
        Ok(outcomes.into_iter().flatten().collect())
    }
}

/// Effects of applying one entity's extraction result
struct Applied {
    outcome: LinkOutcome,
    /// Forced, and the delete of old edges and parent record committed
    forgotten: bool,
    linked: Vec<Fdid>,
    retags: Vec<(Fdid, AssetKind)>,
    diagnostics: Vec<LinkDiagnostic>,
}

impl Applied {
    fn new(outcome: LinkOutcome) -> Self {
        Self {
            outcome,
            forgotten: false,
            linked: Vec::new(),
            retags: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn failed(diagnostic: LinkDiagnostic) -> Self {
        let mut applied = Self::new(LinkOutcome::Failed(diagnostic.clone()));
        applied.diagnostics.push(diagnostic);
        applied
    }
}

/// Write one entity inside its own savepoint.
///
/// Never returns an error: a store failure rolls the savepoint back and is
/// reported as `Failed`.
fn apply_entity(
    tx: &mut rusqlite::Transaction<'_>,
    fdid: Fdid,
    result: Result<Extracted, LinkError>,
    force: bool,
) -> Applied {
    let result = match result {
        Err(LinkError::NotFound(_)) => Ok(Extracted::Skipped(SkipReason::NotInArchive)),
        other => other,
    };

    let sp = match tx.savepoint() {
        Ok(sp) => sp,
        Err(e) => return Applied::failed(store_failure(fdid, e)),
    };

    let written = match &result {
        Ok(Extracted::Linked(extraction)) => write_entity(&sp, fdid, force, Some(extraction), true),
        Ok(Extracted::Skipped(reason)) => {
            write_entity(&sp, fdid, force, None, reason.marks_processed())
        }
        Ok(Extracted::Reclassified(_)) | Err(_) => write_entity(&sp, fdid, force, None, false),
    };

    let inserted = match written.and_then(|inserted| sp.commit().map(|_| inserted)) {
        Ok(inserted) => inserted,
        // Dropping the savepoint rolls it back
        Err(e) => return Applied::failed(store_failure(fdid, e)),
    };

    let mut applied = match result {
        Ok(Extracted::Linked(extraction)) => {
            let mut applied = Applied::new(LinkOutcome::Linked { edges: inserted });
            applied.linked.push(fdid);
            applied.linked.extend(extraction.linked);
            applied.retags = extraction.retags;
            applied.diagnostics = extraction.diagnostics;
            applied
        }
        Ok(Extracted::Skipped(reason)) => {
            let mut applied = Applied::new(LinkOutcome::Skipped(reason.clone()));
            if reason.marks_processed() {
                applied.linked.push(fdid);
            }
            applied.diagnostics.push(LinkDiagnostic::skipped(fdid, reason));
            applied
        }
        Ok(Extracted::Reclassified(kind)) => {
            let mut applied = Applied::new(LinkOutcome::Reclassified(kind));
            applied.retags.push((fdid, kind));
            applied
        }
        Err(e) => Applied::failed(LinkDiagnostic::error(fdid, e.stage(), e.to_string())),
    };
    applied.forgotten = force;
    applied
}

/// Edges and parent records for one entity. Returns newly inserted edge count.
fn write_entity(
    conn: &Connection,
    fdid: Fdid,
    force: bool,
    extraction: Option<&Extraction>,
    mark_processed: bool,
) -> rusqlite::Result<usize> {
    if force {
        edges::delete_edges_for_parent(conn, fdid)?;
        edges::unmark_parent(conn, fdid)?;
    }

    let mut inserted = 0;
    if let Some(extraction) = extraction {
        for edge in &extraction.edges {
            if edges::insert_edge(conn, edge)? == InsertOutcome::Inserted {
                inserted += 1;
            }
        }
        for &parent in &extraction.linked {
            edges::mark_parent_linked(conn, parent)?;
        }
    }

    if mark_processed {
        edges::mark_parent_linked(conn, fdid)?;
    }
    Ok(inserted)
}

fn store_failure(fdid: Fdid, source: rusqlite::Error) -> LinkDiagnostic {
    LinkError::Store { fdid, source }.to_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::diagnostics::DiagnosticStage;
    use crate::formats::{MemoryRecords, ModelRecord};
    use crate::graph::LinkKind;

    fn model_linker(models: &[(Fdid, ModelRecord)], config: LinkConfig) -> (Linker, Arc<MemoryRecords>) {
        let mut archive = MemoryArchive::new();
        let mut records = MemoryRecords::new();
        for (fdid, record) in models {
            archive.add(*fdid, &format!("creature/m{}.m2", fdid), AssetKind::Model, vec![0; 4]);
            records.add_model(*fdid, record.clone());
        }
        let records = Arc::new(records);
        let linker = Linker::new(
            LinkGraph::open_in_memory().unwrap(),
            Arc::new(archive),
            Readers::shared(records.clone()),
        )
        .unwrap()
        .with_config(config);
        (linker, records)
    }

    fn textures(ids: &[Fdid]) -> ModelRecord {
        ModelRecord {
            texture_file_data_ids: ids.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_link_one_then_already_linked() {
        let (mut linker, records) = model_linker(&[(100, textures(&[5, 7]))], LinkConfig::default());

        assert_eq!(
            linker.link_one(AssetKind::Model, 100, false).unwrap(),
            LinkOutcome::Linked { edges: 2 }
        );
        assert_eq!(
            linker.link_one(AssetKind::Model, 100, false).unwrap(),
            LinkOutcome::AlreadyLinked
        );
        assert_eq!(records.decode_count(), 1);
    }

    #[test]
    fn test_force_relinks_without_duplicates() {
        let (mut linker, records) = model_linker(&[(100, textures(&[5, 7]))], LinkConfig::default());

        linker.link_one(AssetKind::Model, 100, false).unwrap();
        assert_eq!(
            linker.link_one(AssetKind::Model, 100, true).unwrap(),
            LinkOutcome::Linked { edges: 2 }
        );
        assert_eq!(records.decode_count(), 2);
        assert_eq!(linker.graph().count_edges().unwrap(), 2);
    }

    #[test]
    fn test_terrain_tiles_are_not_linkable() {
        let (mut linker, _) = model_linker(&[], LinkConfig::default());
        assert_eq!(
            linker.link_one(AssetKind::TerrainTile, 50, false).unwrap(),
            LinkOutcome::Skipped(SkipReason::NotLinkable)
        );
    }

    #[test]
    fn test_zero_edge_parent_is_remembered() {
        let (mut linker, records) = model_linker(&[(100, ModelRecord::default())], LinkConfig::default());

        assert_eq!(
            linker.link_one(AssetKind::Model, 100, false).unwrap(),
            LinkOutcome::Linked { edges: 0 }
        );
        assert!(linker.parents().contains(100));
        assert_eq!(
            linker.link_one(AssetKind::Model, 100, false).unwrap(),
            LinkOutcome::AlreadyLinked
        );
        assert_eq!(records.decode_count(), 1);
    }

    #[test]
    fn test_decode_failure_is_not_remembered() {
        let mut archive = MemoryArchive::new();
        archive.add(100, "creature/broken.m2", AssetKind::Model, vec![0; 3]);
        let mut records = MemoryRecords::new();
        records.add_malformed(100, "truncated");
        let mut linker = Linker::new(
            LinkGraph::open_in_memory().unwrap(),
            Arc::new(archive),
            Readers::shared(Arc::new(records)),
        )
        .unwrap();

        let outcome = linker.link_one(AssetKind::Model, 100, false).unwrap();
        assert!(matches!(outcome, LinkOutcome::Failed(LinkDiagnostic::Error { fdid: 100, .. })));
        assert!(!linker.parents().contains(100));
        assert_eq!(linker.take_diagnostics().len(), 1);
    }

    #[test]
    fn test_parallel_and_serial_agree() {
        let models: Vec<(Fdid, ModelRecord)> = (1..=40)
            .map(|i| (i, textures(&[1000 + i, 2000 + i])))
            .collect();

        let (mut serial, _) = model_linker(
            &models,
            LinkConfig {
                batch_size: 7,
                parallel: false,
            },
        );
        let (mut parallel, _) = model_linker(
            &models,
            LinkConfig {
                batch_size: 7,
                parallel: true,
            },
        );

        serial.link_all(false, None).unwrap();
        parallel.link_all(false, None).unwrap();

        assert_eq!(
            serial.graph().all_edges().unwrap(),
            parallel.graph().all_edges().unwrap()
        );
        assert_eq!(parallel.graph().count_edges().unwrap(), 80);
    }

    #[test]
    fn test_report_counts_and_run_log() {
        let (mut linker, _) = model_linker(
            &[(100, textures(&[5, 0, 7])), (101, ModelRecord::default())],
            LinkConfig::default(),
        );

        let report = linker.link_all(false, None).unwrap();
        let models = report.pass(AssetKind::Model).unwrap();
        assert_eq!(models.total, 2);
        assert_eq!(models.linked, 2);
        assert_eq!(models.edges_inserted, 2);
        assert!(report.pass(AssetKind::ModelContainer).is_none());

        let runs = linker.graph().recent_runs(5).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_id, report.run_id);
        assert_eq!(runs[0].edges_inserted, 2);
        assert_eq!(runs[0].outcome, "success");

        assert_eq!(
            linker.graph().edges_for_parent(100).unwrap()[0].link_type,
            LinkKind::ModelTexture
        );
    }

    #[test]
    fn test_failed_force_keeps_parent_indexed() {
        let (mut linker, _) = model_linker(&[(100, textures(&[5, 7]))], LinkConfig::default());
        linker.link_one(AssetKind::Model, 100, false).unwrap();
        linker
            .graph()
            .connection()
            .execute_batch(
                "CREATE TRIGGER keep_100 BEFORE DELETE ON wow_rootfiles_links
                 WHEN OLD.parent = 100
                 BEGIN SELECT RAISE(ABORT, 'locked'); END;",
            )
            .unwrap();

        let outcome = linker.link_one(AssetKind::Model, 100, true).unwrap();
        assert!(matches!(
            outcome,
            LinkOutcome::Failed(LinkDiagnostic::Error {
                fdid: 100,
                stage: DiagnosticStage::Store,
                ..
            })
        ));
        assert!(linker.parents().contains(100));
        assert_eq!(linker.graph().count_edges().unwrap(), 2);
    }

    #[test]
    fn test_shutdown_before_first_chunk() {
        let flag = Arc::new(AtomicBool::new(true));
        let (linker, _) = model_linker(&[(100, textures(&[5]))], LinkConfig::default());
        let mut linker = linker.with_shutdown(flag);

        let report = linker.link_all(false, None).unwrap();
        assert!(report.interrupted);
        assert_eq!(report.outcome(), "interrupted");
        assert_eq!(linker.graph().count_edges().unwrap(), 0);
    }
}
