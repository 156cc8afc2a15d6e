//! aro server library entry.
//!
//! Wires config, persistence backends, the metric store and anomaly counter
//! services, and the HTTP surface into one stack. It is consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
pub mod store;
