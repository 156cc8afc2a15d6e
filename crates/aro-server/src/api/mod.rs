//! Producer/consumer HTTP endpoints.
//!
//! - `POST /api/metrics`          : create one metric
//! - `GET  /api/metrics`          : paged, sorted listing
//! - `POST /api/anomalies/report` : bump the anomaly counter

pub mod anomalies;
pub mod error;
pub mod metrics;

pub use error::ApiError;
