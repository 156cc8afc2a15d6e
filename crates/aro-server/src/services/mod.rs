//! Built-in services: the metric store and the anomaly signal counter.

pub mod anomaly;
pub mod metric_store;

pub use anomaly::AnomalyCounter;
pub use metric_store::{MetricStore, PageParams, QueryLimits};
