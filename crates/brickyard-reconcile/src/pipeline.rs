//! [`Reconciler`]: one end-to-end reconciliation run.

use std::collections::BTreeMap;

use brickyard_core::{manual::ManualResolver, remote::CatalogApi, store::CatalogStore};
use brickyard_instabrick::ExportItem;
use serde::Serialize;
use tracing::Instrument as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  cascade::Cascade,
  colors::sync_colors,
  commit::{CommitFailure, CommitTally, MigrationCommitter},
  ingest::{IngestReport, ingest_export},
  names::fill_names,
  resolver::{BatchResolver, DEFAULT_CHUNK_SIZE},
  strategy::{DEFAULT_ORDER, StrategyKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
  /// Ids per bulk request and aliases per commit.
  pub chunk_size:  usize,
  /// Append the manual stage to the cascade.
  pub interactive: bool,
  /// Refresh the colour catalog before anything else.
  pub sync_colors: bool,
}

impl Default for ReconcileOptions {
  fn default() -> Self {
    Self { chunk_size: DEFAULT_CHUNK_SIZE, interactive: false, sync_colors: false }
  }
}

impl ReconcileOptions {
  pub fn strategies(&self) -> Vec<StrategyKind> {
    let mut order = DEFAULT_ORDER.to_vec();
    if self.interactive {
      order.push(StrategyKind::Manual);
    }
    order
  }
}

/// Summary of a run, logged at the end and optionally printed as JSON.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
  pub run_id:          String,
  pub colors_synced:   Option<usize>,
  pub ingest:          Option<IngestReport>,
  /// Placeholder aliases handed to the cascade.
  pub attempted:       usize,
  pub resolved_by:     BTreeMap<StrategyKind, usize>,
  pub migrated:        usize,
  pub rows_moved:      usize,
  pub confirmed:       usize,
  pub skipped:         Vec<String>,
  pub commit_failures: Vec<CommitFailure>,
  pub unresolved:      Vec<String>,
  pub names_filled:    usize,
  /// Inventory rows pointing at a missing part after the run.
  pub orphaned_rows:   usize,
}

impl ReconcileReport {
  pub fn resolved(&self) -> usize { self.resolved_by.values().sum() }
}

/// Wires the store, the remote catalog, and an optional manual resolver into
/// a reconciliation run.
pub struct Reconciler<S, A> {
  store:   S,
  api:     A,
  options: ReconcileOptions,
  manual:  Option<Box<dyn ManualResolver>>,
}

impl<S: CatalogStore, A: CatalogApi> Reconciler<S, A> {
  pub fn new(store: S, api: A, options: ReconcileOptions) -> Result<Self> {
    if options.chunk_size == 0 || options.chunk_size > crate::MAX_CHUNK_SIZE {
      return Err(Error::InvalidChunkSize(options.chunk_size));
    }
    Ok(Self { store, api, options, manual: None })
  }

  pub fn with_manual(mut self, manual: Box<dyn ManualResolver>) -> Self {
    self.manual = Some(manual);
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn api(&self) -> &A { &self.api }

  /// Run the whole pipeline: colour sync (optional), export ingestion
  /// (optional), the cascade over every placeholder, name fill, and the
  /// referential-integrity check.
  ///
  /// Only fatal remote failures and store failures end the run early; all
  /// chunks committed before that point stay committed.
  pub async fn run(&self, export: Option<Vec<ExportItem>>) -> Result<ReconcileReport> {
    let run_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("reconcile", %run_id);
    self.run_inner(run_id, export).instrument(span).await
  }

  async fn run_inner(
    &self,
    run_id: String,
    export: Option<Vec<ExportItem>>,
  ) -> Result<ReconcileReport> {
    let resolver = BatchResolver::new(&self.api, self.options.chunk_size)?;
    let committer = MigrationCommitter::new(&self.store, &run_id);
    let mut report = ReconcileReport { run_id: run_id.clone(), ..ReconcileReport::default() };

    if self.options.sync_colors {
      report.colors_synced = Some(sync_colors(&self.store, &self.api).await?);
    }

    if let Some(items) = export {
      let ingest = ingest_export(&self.store, &self.api, &resolver, &committer, items).await?;
      report.ingest = Some(ingest);
    }

    let placeholders = self.store.placeholder_aliases().await.map_err(Error::store)?;
    report.attempted = placeholders.len();
    if placeholders.is_empty() {
      tracing::info!("no placeholder aliases to reconcile");
    } else {
      tracing::info!(total = placeholders.len(), "found placeholder aliases");
      let mut cascade =
        Cascade::new(&self.api, self.options.chunk_size, self.options.strategies())?;
      if let Some(manual) = self.manual.as_deref() {
        cascade = cascade.with_manual(manual);
      }
      let outcome = cascade.run(&committer, placeholders).await?;
      let CommitTally { migrated, rows_moved, confirmed, skipped, failures } = outcome.commits;
      report.resolved_by = outcome.resolved_by;
      report.unresolved = outcome.unresolved;
      report.migrated = migrated;
      report.rows_moved = rows_moved;
      report.confirmed = confirmed;
      report.skipped = skipped;
      report.commit_failures = failures;
      tracing::info!(
        "Reconciliation complete: {}/{} resolved",
        report.resolved(),
        report.attempted
      );
    }

    report.names_filled = fill_names(&self.store, &resolver).await?;

    let orphans = self.store.orphaned_inventory().await.map_err(Error::store)?;
    for row in &orphans {
      tracing::warn!(id = row.id, design_id = %row.design_id, "inventory row references a missing part");
    }
    report.orphaned_rows = orphans.len();

    tracing::info!(
      attempted = report.attempted,
      resolved = report.resolved(),
      unresolved = report.unresolved.len(),
      failures = report.commit_failures.len(),
      names_filled = report.names_filled,
      "run finished"
    );
    Ok(report)
  }
}
