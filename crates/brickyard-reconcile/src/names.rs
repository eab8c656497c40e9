//! Name fill: upgrade canonical parts still carrying the placeholder name.

use brickyard_core::{catalog::PartDetails, remote::CatalogApi, store::CatalogStore};

use crate::{Error, Result, error::soften, resolver::BatchResolver};

/// Look up every part whose name is still a placeholder, in chunks keyed by
/// canonical id, and store whatever details come back. Returns the number
/// of parts changed.
pub async fn fill_names<S, A>(store: &S, resolver: &BatchResolver<'_, A>) -> Result<usize>
where
  S: CatalogStore,
  A: CatalogApi,
{
  let ids = store.parts_with_placeholder_names().await.map_err(Error::store)?;
  if ids.is_empty() {
    return Ok(0);
  }
  let total = ids.len();
  tracing::info!(total, "filling placeholder names");

  let mut filled = 0;
  let mut done = 0;
  for chunk in ids.chunks(resolver.chunk_size()) {
    done += chunk.len();
    let Some(found) = soften(resolver.resolve_designs(chunk).await, "name fill")? else {
      continue;
    };
    let details: Vec<PartDetails> = found
      .into_iter()
      .map(|(design_id, part)| PartDetails { design_id, ..part.to_details() })
      .collect();
    filled += store.fill_part_details(details).await.map_err(Error::store)?;
    tracing::info!("{done}/{total} done");
  }
  tracing::info!(filled, total, "name fill complete");
  Ok(filled)
}
