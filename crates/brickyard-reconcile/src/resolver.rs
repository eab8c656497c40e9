//! The batch resolver: one bounded bulk request in, an id → part map out.

use std::collections::BTreeMap;

use brickyard_core::remote::{CatalogApi, RemotePart};

use crate::{Error, Result};

/// Ids per request when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Hard ceiling imposed by the remote catalog.
pub const MAX_CHUNK_SIZE: usize = 100;

/// Translates bulk catalog responses into per-id matches.
///
/// Never splits its input: callers chunk, because they report progress per
/// chunk. Has no side effects.
pub struct BatchResolver<'a, A> {
  api:        &'a A,
  chunk_size: usize,
}

impl<'a, A: CatalogApi> BatchResolver<'a, A> {
  pub fn new(api: &'a A, chunk_size: usize) -> Result<Self> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
      return Err(Error::InvalidChunkSize(chunk_size));
    }
    Ok(Self { api, chunk_size })
  }

  pub fn chunk_size(&self) -> usize { self.chunk_size }

  fn check(&self, ids: &[String]) -> Result<()> {
    if ids.len() > self.chunk_size {
      return Err(Error::BatchTooLarge { len: ids.len(), max: self.chunk_size });
    }
    Ok(())
  }

  /// Map each foreign id in `ids` to the catalog part that lists it.
  /// Ids with no match are absent from the result.
  pub async fn resolve_batch(&self, ids: &[String]) -> Result<BTreeMap<String, RemotePart>> {
    self.check(ids)?;
    if ids.is_empty() {
      return Ok(BTreeMap::new());
    }
    let parts = self.api.parts_by_bricklink(ids).await?;
    Ok(match_ids(ids, &parts, RemotePart::has_bricklink_id))
  }

  /// Like [`Self::resolve_batch`], keyed by canonical id instead.
  pub async fn resolve_designs(&self, ids: &[String]) -> Result<BTreeMap<String, RemotePart>> {
    self.check(ids)?;
    if ids.is_empty() {
      return Ok(BTreeMap::new());
    }
    let parts = self.api.parts_by_design(ids).await?;
    Ok(match_ids(ids, &parts, |p, id| p.design_id.eq_ignore_ascii_case(id)))
  }
}

/// First part (in response order) matching each requested id.
fn match_ids(
  ids: &[String],
  parts: &[RemotePart],
  matches: impl Fn(&RemotePart, &str) -> bool,
) -> BTreeMap<String, RemotePart> {
  ids
    .iter()
    .filter_map(|id| {
      parts
        .iter()
        .find(|p| matches(p, id))
        .map(|p| (id.clone(), p.clone()))
    })
    .collect()
}
