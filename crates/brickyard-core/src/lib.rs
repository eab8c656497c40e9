//! Core types and trait definitions for the brickyard LEGO catalog.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store, the remote catalog client, and the reconciliation pipeline all
//! depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod error;
pub mod manual;
pub mod remote;
pub mod store;

pub use error::{Error, Result};
