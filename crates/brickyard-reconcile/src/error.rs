//! Error type for `brickyard-reconcile`.

use brickyard_core::remote::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("remote catalog: {0}")]
  Api(#[from] ApiError),

  #[error("batch of {len} ids exceeds the per-request limit of {max}")]
  BatchTooLarge { len: usize, max: usize },

  #[error("chunk size {0} is outside 1..={max}", max = crate::MAX_CHUNK_SIZE)]
  InvalidChunkSize(usize),

  #[error("export: {0}")]
  Export(#[from] brickyard_instabrick::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  /// Whether the run must stop. Everything else is a per-alias miss.
  pub fn is_fatal(&self) -> bool {
    match self {
      Self::Api(e) => e.is_fatal(),
      _ => true,
    }
  }
}

/// Downgrade a non-fatal remote failure to a miss; fatal ones propagate.
pub(crate) fn soften<T>(result: Result<T>, context: &str) -> Result<Option<T>> {
  match result {
    Ok(v) => Ok(Some(v)),
    Err(e) if e.is_fatal() => Err(e),
    Err(e) => {
      tracing::warn!(%context, error = %e, "lookup failed, treating as unresolved");
      Ok(None)
    }
  }
}
