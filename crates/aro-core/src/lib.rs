//! aro core: transport-agnostic metric model, ordering/pagination rules, and errors.
//!
//! This crate defines the data contract and error surface shared by the server
//! and any tooling that reads or writes metric records. It carries no
//! transport or runtime dependencies so repository backends and tests can use
//! it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `AroError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod error;
pub mod ledger;
pub mod model;
pub mod query;

/// Shared result type.
pub use error::{AroError, Result};
pub use model::{Metric, NewMetric};
pub use query::{Direction, Page, PageRequest, Sort, SortField};
