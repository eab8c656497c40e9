//! Colour resolution. No cascade: a BrickLink colour id is either in the
//! alias table or found by one remote lookup.

use brickyard_core::{
  catalog::{Color, ColorAlias},
  remote::{CatalogApi, RemoteColor},
  store::CatalogStore,
};

use crate::{Error, Result, error::soften};

/// Store a remote colour and every BrickLink id it lists. Returns `false`
/// if the colour's hex value is unusable.
async fn store_color<S: CatalogStore>(store: &S, remote: &RemoteColor) -> Result<bool> {
  let color = match Color::new(remote.id, remote.name.clone(), &remote.rgb) {
    Ok(c) => c,
    Err(e) => {
      tracing::warn!(id = remote.id, error = %e, "skipping colour");
      return Ok(false);
    }
  };
  store.upsert_color(color).await.map_err(Error::store)?;
  for &alias_id in &remote.bricklink_ids {
    store
      .record_color_alias(ColorAlias { alias_id, color_id: remote.id })
      .await
      .map_err(Error::store)?;
  }
  Ok(true)
}

/// Page through the whole remote colour catalog and store it. Returns the
/// number of colours stored.
pub async fn sync_colors<S: CatalogStore, A: CatalogApi>(store: &S, api: &A) -> Result<usize> {
  let remote = api.all_colors().await?;
  let mut stored = 0;
  for color in &remote {
    if store_color(store, color).await? {
      stored += 1;
    }
  }
  tracing::info!(stored, fetched = remote.len(), "colour catalog synced");
  Ok(stored)
}

/// The canonical colour for `bricklink_id`: the alias table first, then a
/// single remote lookup whose result is stored.
pub async fn resolve_color<S: CatalogStore, A: CatalogApi>(
  store: &S,
  api: &A,
  bricklink_id: i64,
) -> Result<Option<i64>> {
  if let Some(id) = store.resolve_color(bricklink_id).await.map_err(Error::store)? {
    return Ok(Some(id));
  }
  let context = format!("colour {bricklink_id}");
  let hits = soften(api.colors_by_bricklink(bricklink_id).await.map_err(Error::from), &context)?
    .unwrap_or_default();
  for hit in &hits {
    if store_color(store, hit).await? {
      // The hit may not list the id it was found by; record it explicitly.
      store
        .record_color_alias(ColorAlias { alias_id: bricklink_id, color_id: hit.id })
        .await
        .map_err(Error::store)?;
      return Ok(Some(hit.id));
    }
  }
  tracing::debug!(bricklink_id, "colour not found");
  Ok(None)
}
