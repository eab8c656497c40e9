//! Wire shapes of the Rebrickable API.
//!
//! Only the fields brickyard reads are modelled. List endpoints are decoded
//! item by item so one malformed record does not sink a page.

use brickyard_core::remote::{RemoteColor, RemotePart};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

/// The paginated list envelope.
#[derive(Debug, Deserialize)]
pub struct Page {
  #[serde(default)]
  pub results: Vec<Value>,
  pub next:    Option<String>,
}

// ─── Parts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PartDto {
  pub part_num:     String,
  #[serde(default)]
  pub name:         String,
  pub part_url:     Option<String>,
  pub part_img_url: Option<String>,
  #[serde(default)]
  pub external_ids: PartExternalIds,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartExternalIds {
  #[serde(rename = "BrickLink", default)]
  pub bricklink: Vec<String>,
}

impl PartDto {
  pub fn into_remote(self) -> RemotePart {
    RemotePart {
      design_id:     self.part_num,
      name:          self.name,
      url:           self.part_url,
      image_url:     self.part_img_url,
      bricklink_ids: self.external_ids.bricklink,
    }
  }
}

// ─── Colours ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ColorDto {
  pub id:           i64,
  pub name:         String,
  pub rgb:          String,
  #[serde(default)]
  pub external_ids: ColorExternalIds,
}

#[derive(Debug, Default, Deserialize)]
pub struct ColorExternalIds {
  #[serde(rename = "BrickLink")]
  pub bricklink: Option<ExternalIdList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExternalIdList {
  #[serde(default)]
  pub ext_ids: Vec<i64>,
}

impl ColorDto {
  pub fn into_remote(self) -> RemoteColor {
    RemoteColor {
      id:            self.id,
      name:          self.name,
      rgb:           self.rgb,
      bricklink_ids: self.external_ids.bricklink.map(|b| b.ext_ids).unwrap_or_default(),
    }
  }
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Decode each item, logging and dropping the ones that do not fit `T`.
pub fn decode_items<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
  items
    .into_iter()
    .filter_map(|item| match serde_json::from_value(item) {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!(kind = what, error = %e, "skipping malformed item");
        None
      }
    })
    .collect()
}

/// Decode a single record, logging and returning `None` if it does not fit.
pub fn decode_one<T: DeserializeOwned>(item: Value, what: &str) -> Option<T> {
  decode_items(vec![item], what).pop()
}
