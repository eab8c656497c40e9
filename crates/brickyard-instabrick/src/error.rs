//! Error type for `brickyard-instabrick`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed export: {0}")]
  Xml(#[from] quick_xml::DeError),

  #[error("item #{index} has no ITEMID")]
  MissingItemId { index: usize },

  #[error("item {item_id}: {field} {value:?} is not a valid number")]
  InvalidNumber { item_id: String, field: &'static str, value: String },

  #[error("item {item_id}: negative quantity {quantity}")]
  NegativeQuantity { item_id: String, quantity: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
