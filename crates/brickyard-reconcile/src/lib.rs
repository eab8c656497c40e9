//! Identity reconciliation for brickyard.
//!
//! Placeholder aliases (foreign part ids registered as if they were
//! canonical) are pushed through an ordered [`cascade`] of resolution
//! strategies. Every chunk of resolved aliases is handed to the
//! [`commit::MigrationCommitter`] before the next chunk is looked at, so
//! progress survives a later failure.
//!
//! Everything here is generic over [`brickyard_core::store::CatalogStore`]
//! and [`brickyard_core::remote::CatalogApi`]; no HTTP or SQL lives in this
//! crate.

pub mod cascade;
pub mod colors;
pub mod commit;
pub mod error;
pub mod ingest;
pub mod names;
pub mod pipeline;
pub mod resolver;
pub mod strategy;

pub use error::{Error, Result};
pub use pipeline::{ReconcileOptions, ReconcileReport, Reconciler};
pub use resolver::{BatchResolver, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use strategy::StrategyKind;
