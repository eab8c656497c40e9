//! [`CatalogApi`] over the Rebrickable endpoints.

use brickyard_core::remote::{ApiError, CatalogApi, RemoteColor, RemotePart};
use futures::TryStreamExt as _;
use serde_json::Value;

use crate::{
  Error, Result,
  client::RebrickableClient,
  model::{ColorDto, Page, PartDto, decode_items, decode_one},
};

const PARTS: &str = "/parts/";
const COLORS: &str = "/colors/";

impl RebrickableClient {
  async fn collect(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
    self.fetch_all(endpoint, query).try_collect().await
  }

  async fn parts_where(&self, filter: &str, ids: &[String]) -> Result<Vec<RemotePart>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let query = [(filter, ids.join(",")), ("inc_part_details", "1".to_owned())];
    let items = self.collect(PARTS, &query).await?;
    Ok(
      decode_items::<PartDto>(items, "part")
        .into_iter()
        .map(PartDto::into_remote)
        .collect(),
    )
  }
}

impl CatalogApi for RebrickableClient {
  async fn parts_by_bricklink(&self, bricklink_ids: &[String]) -> Result<Vec<RemotePart>, ApiError> {
    Ok(self.parts_where("bricklink_id__in", bricklink_ids).await?)
  }

  async fn parts_by_design(&self, design_ids: &[String]) -> Result<Vec<RemotePart>, ApiError> {
    Ok(self.parts_where("part_nums", design_ids).await?)
  }

  async fn part(&self, design_id: &str) -> Result<Option<RemotePart>, ApiError> {
    let id = design_id.trim();
    // Cannot name a catalog entry and would escape the path segment.
    if id.is_empty() || id.contains(['/', '?', '#', '%']) {
      return Ok(None);
    }
    match self.fetch(&format!("{PARTS}{id}/"), &[]).await {
      Ok(body) => Ok(decode_one::<PartDto>(body, "part").map(PartDto::into_remote)),
      Err(Error::NotFound(_)) => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn search_parts(&self, query: &str) -> Result<Vec<RemotePart>, ApiError> {
    let body = self
      .fetch(PARTS, &[("search", query.to_owned()), ("inc_part_details", "1".to_owned())])
      .await?;
    let items = serde_json::from_value::<Page>(body)
      .map(|page| page.results)
      .map_err(|e| Error::Decode { url: PARTS.to_owned(), reason: e.to_string() })?;
    Ok(
      decode_items::<PartDto>(items, "part")
        .into_iter()
        .map(PartDto::into_remote)
        .collect(),
    )
  }

  async fn colors_by_bricklink(&self, bricklink_id: i64) -> Result<Vec<RemoteColor>, ApiError> {
    let items = self
      .collect(COLORS, &[("bricklink_id__in", bricklink_id.to_string())])
      .await?;
    // The filter is advisory on some deployments; enforce it here.
    Ok(
      decode_items::<ColorDto>(items, "colour")
        .into_iter()
        .map(ColorDto::into_remote)
        .filter(|c| c.bricklink_ids.contains(&bricklink_id))
        .collect(),
    )
  }

  async fn all_colors(&self) -> Result<Vec<RemoteColor>, ApiError> {
    let items = self.collect(COLORS, &[("page_size", "1000".to_owned())]).await?;
    Ok(
      decode_items::<ColorDto>(items, "colour")
        .into_iter()
        .map(ColorDto::into_remote)
        .collect(),
    )
  }
}
