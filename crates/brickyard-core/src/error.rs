//! Error types for `brickyard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid hex colour: {0:?}")]
  InvalidHex(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
