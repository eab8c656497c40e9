//! Export ingestion: load an Instabrick export into the catalog.
//!
//! Part ids are resolved through the store, then the bulk endpoint; ids
//! nobody knows become placeholders named after the export's item name so
//! the cascade can work on them later. Items whose colour cannot be
//! resolved are skipped and reported.

use std::collections::BTreeMap;

use brickyard_core::{
  catalog::{Migration, NewInventoryRow},
  remote::CatalogApi,
  store::CatalogStore,
};
use brickyard_instabrick::ExportItem;
use serde::Serialize;

use crate::{
  Error, Result,
  colors::resolve_color,
  commit::{CommitTally, MigrationCommitter},
  error::soften,
  resolver::BatchResolver,
};

/// An export item left out because its colour is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
  pub item_id: String,
  pub color:   i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
  pub items:        usize,
  pub rows:         usize,
  /// Distinct ids registered as placeholders.
  pub placeholders: usize,
  pub skipped:      Vec<SkippedItem>,
}

pub async fn ingest_export<S, A>(
  store: &S,
  api: &A,
  resolver: &BatchResolver<'_, A>,
  committer: &MigrationCommitter<'_, S>,
  items: Vec<ExportItem>,
) -> Result<IngestReport>
where
  S: CatalogStore,
  A: CatalogApi,
{
  let mut report = IngestReport { items: items.len(), ..IngestReport::default() };

  // ── Colours ─────────────────────────────────────────────────────────────
  let mut color_for: BTreeMap<i64, Option<i64>> = BTreeMap::new();
  for item in &items {
    if !color_for.contains_key(&item.color) {
      let resolved = resolve_color(store, api, item.color).await?;
      color_for.insert(item.color, resolved);
    }
  }

  let mut loadable: Vec<(ExportItem, i64)> = Vec::with_capacity(items.len());
  for item in items {
    match color_for.get(&item.color).copied().flatten() {
      Some(color_id) => loadable.push((item, color_id)),
      None => {
        tracing::warn!(item = %item.item_id, color = item.color, "unknown colour, item skipped");
        report.skipped.push(SkippedItem { item_id: item.item_id, color: item.color });
      }
    }
  }

  // ── Parts ───────────────────────────────────────────────────────────────
  let mut design_for: BTreeMap<String, String> = BTreeMap::new();
  let mut unknown: Vec<String> = Vec::new();
  for (item, _) in &loadable {
    if design_for.contains_key(&item.item_id) || unknown.contains(&item.item_id) {
      continue;
    }
    match store.resolve_part(&item.item_id).await.map_err(Error::store)? {
      Some(design_id) => {
        design_for.insert(item.item_id.clone(), design_id);
      }
      None => unknown.push(item.item_id.clone()),
    }
  }

  let total = unknown.len();
  let mut done = 0;
  let mut tally = CommitTally::default();
  for chunk in unknown.chunks(resolver.chunk_size()) {
    done += chunk.len();
    let found = soften(resolver.resolve_batch(chunk).await, "export lookup")?.unwrap_or_default();
    let batch: Vec<Migration> = chunk
      .iter()
      .filter_map(|alias| found.get(alias).map(|part| (alias, part)))
      .map(|(alias, part)| Migration {
        alias_id: alias.clone(),
        part:     part.to_canonical(),
        source:   "export".to_owned(),
      })
      .collect();
    let outcomes = committer.commit(batch.clone(), &mut tally).await?;
    for (migration, outcome) in batch.into_iter().zip(outcomes) {
      if outcome.is_applied() {
        design_for.insert(migration.alias_id, migration.part.design_id);
      }
    }
    tracing::info!("{done}/{total} export ids looked up");
  }

  // Whatever is still unknown becomes a placeholder for the cascade.
  for alias in &unknown {
    if design_for.contains_key(alias) {
      continue;
    }
    let name = loadable
      .iter()
      .find(|(item, _)| &item.item_id == alias)
      .map(|(item, _)| item.item_name.clone())
      .unwrap_or_default();
    store
      .register_placeholder(alias.clone(), name)
      .await
      .map_err(Error::store)?;
    design_for.insert(alias.clone(), alias.clone());
    report.placeholders += 1;
  }

  // ── Inventory ───────────────────────────────────────────────────────────
  for (item, color_id) in loadable {
    let design_id = design_for
      .get(&item.item_id)
      .cloned()
      .unwrap_or_else(|| item.item_id.clone());
    let placement = item.placement;
    store
      .insert_inventory(NewInventoryRow {
        design_id,
        color_id,
        quantity: item.quantity,
        status: placement.status,
        drawer: placement.drawer,
        container: placement.container,
        set_number: placement.set_number,
      })
      .await
      .map_err(Error::store)?;
    report.rows += 1;
  }

  tracing::info!(
    items = report.items,
    rows = report.rows,
    placeholders = report.placeholders,
    skipped = report.skipped.len(),
    "export ingested"
  );
  Ok(report)
}
