//! The remote catalog seam.
//!
//! [`CatalogApi`] is implemented by `brickyard-rebrickable` against the live
//! parts database and by in-memory fakes in tests. The reconciliation layer
//! depends only on this trait.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CanonicalPart, PartDetails};

// ─── Remote records ──────────────────────────────────────────────────────────

/// A part record as returned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePart {
  pub design_id:     String,
  pub name:          String,
  pub url:           Option<String>,
  pub image_url:     Option<String>,
  /// Foreign (BrickLink) identifiers the catalog lists for this part.
  pub bricklink_ids: Vec<String>,
}

impl RemotePart {
  /// Whether `id` is one of this part's foreign identifiers, ignoring case.
  pub fn has_bricklink_id(&self, id: &str) -> bool {
    self.bricklink_ids.iter().any(|b| b.eq_ignore_ascii_case(id))
  }

  pub fn to_canonical(&self) -> CanonicalPart {
    CanonicalPart {
      design_id: self.design_id.clone(),
      name:      self.name.clone(),
      url:       self.url.clone(),
      image_url: self.image_url.clone(),
    }
  }

  pub fn to_details(&self) -> PartDetails {
    PartDetails {
      design_id: self.design_id.clone(),
      name:      Some(self.name.clone()).filter(|n| !n.trim().is_empty()),
      url:       self.url.clone(),
      image_url: self.image_url.clone(),
    }
  }
}

/// A colour record as returned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteColor {
  pub id:            i64,
  pub name:          String,
  /// Hex string as delivered; normalised by [`crate::catalog::Color::new`].
  pub rgb:           String,
  pub bricklink_ids: Vec<i64>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A remote failure that survived the client's own retry handling.
///
/// "Not found" is deliberately absent: single-item lookups report a miss as
/// `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// The credentials were rejected (401 / 403).
  #[error("remote catalog rejected the credentials (HTTP {status})")]
  Unauthorized { status: u16 },

  /// Transient failures persisted past the configured attempt ceiling.
  #[error("gave up after {attempts} attempts: {last}")]
  RetriesExhausted { attempts: u32, last: String },

  /// Any other non-success status.
  #[error("remote catalog returned HTTP {status}: {body}")]
  Remote { status: u16, body: String },

  /// A request could not be issued at all (bad URL, TLS setup, ...).
  #[error("transport error: {0}")]
  Transport(String),

  /// The response body was not the expected shape.
  #[error("malformed response: {0}")]
  Decode(String),
}

impl ApiError {
  /// Fatal errors end the run; everything else downgrades to "unresolved".
  pub fn is_fatal(&self) -> bool {
    matches!(self, Self::Unauthorized { .. } | Self::RetriesExhausted { .. })
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only access to the remote parts catalog.
///
/// Bulk methods accept at most the remote's per-request id limit; splitting
/// larger inputs is the caller's job.
pub trait CatalogApi: Send + Sync {
  /// Parts whose foreign-id list intersects `bricklink_ids`.
  fn parts_by_bricklink<'a>(
    &'a self,
    bricklink_ids: &'a [String],
  ) -> impl Future<Output = Result<Vec<RemotePart>, ApiError>> + Send + 'a;

  /// Parts whose canonical id is one of `design_ids`.
  fn parts_by_design<'a>(
    &'a self,
    design_ids: &'a [String],
  ) -> impl Future<Output = Result<Vec<RemotePart>, ApiError>> + Send + 'a;

  /// A single part by canonical id. `Ok(None)` if the catalog has no such
  /// part.
  fn part<'a>(
    &'a self,
    design_id: &'a str,
  ) -> impl Future<Output = Result<Option<RemotePart>, ApiError>> + Send + 'a;

  /// First page of a free-text part search, in the catalog's ranking order.
  fn search_parts<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<RemotePart>, ApiError>> + Send + 'a;

  /// Colours whose BrickLink id list contains `bricklink_id`.
  fn colors_by_bricklink(
    &self,
    bricklink_id: i64,
  ) -> impl Future<Output = Result<Vec<RemoteColor>, ApiError>> + Send + '_;

  /// Every colour in the catalog, following pagination to the end.
  fn all_colors(
    &self,
  ) -> impl Future<Output = Result<Vec<RemoteColor>, ApiError>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_credentials_and_exhaustion_are_fatal() {
    assert!(ApiError::Unauthorized { status: 401 }.is_fatal());
    assert!(
      ApiError::RetriesExhausted { attempts: 4, last: "HTTP 503".into() }.is_fatal()
    );
    assert!(!ApiError::Remote { status: 400, body: String::new() }.is_fatal());
    assert!(!ApiError::Decode("eof".into()).is_fatal());
    assert!(!ApiError::Transport("bad url".into()).is_fatal());
  }

  #[test]
  fn bricklink_match_ignores_case() {
    let p = RemotePart {
      design_id:     "3001".into(),
      name:          "Brick 2 x 4".into(),
      url:           None,
      image_url:     None,
      bricklink_ids: vec!["3001A".into()],
    };
    assert!(p.has_bricklink_id("3001a"));
    assert!(!p.has_bricklink_id("3001"));
  }
}
