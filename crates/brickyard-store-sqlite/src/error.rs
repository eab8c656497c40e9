//! Error type for `brickyard-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("identifier must not be blank")]
  BlankIdentifier,

  #[error("negative quantity {quantity} for part {design_id}")]
  NegativeQuantity { design_id: String, quantity: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
