//! Rate-limited client for the Rebrickable parts catalog.
//!
//! [`RebrickableClient`] paces every request, retries transient failures with
//! jittered exponential backoff, and classifies everything else into
//! [`Error`]. It implements [`brickyard_core::remote::CatalogApi`] so the
//! reconciliation layer never sees HTTP.

mod api;
mod client;
mod model;

pub mod error;
pub mod retry;

pub use client::{RebrickableClient, RebrickableConfig};
pub use error::{Error, Result};
pub use retry::RetryPolicy;
