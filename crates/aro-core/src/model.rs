//! Metric entity and the producer-facing candidate record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AroError, Result};

/// A single persisted observation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Store-assigned identifier, strictly increasing, never reused.
    pub id: u64,
    /// Origin system (host, service, ...).
    pub source: String,
    /// Measurement category (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub metric_type: String,
    pub value: f64,
    /// Store-assigned UTC instant of persistence.
    pub timestamp: DateTime<Utc>,
}

/// Candidate submitted by a producer.
///
/// `id` and `timestamp` are accepted so clients echoing a previous record do
/// not get rejected, but both are discarded; the store assigns its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewMetric {
    pub source: String,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub value: f64,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

impl NewMetric {
    pub fn new(source: impl Into<String>, metric_type: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            metric_type: metric_type.into(),
            value,
            id: None,
            timestamp: None,
        }
    }

    /// Reject values that cannot round-trip through JSON.
    ///
    /// Strings are free text (empty is fine) and any finite `f64` is accepted.
    pub fn validate(&self) -> Result<()> {
        if !self.value.is_finite() {
            return Err(AroError::InvalidMetric(format!(
                "value must be finite, got {}",
                self.value
            )));
        }
        Ok(())
    }

    /// Build the persisted record from store-assigned fields.
    pub fn into_metric(self, id: u64, timestamp: DateTime<Utc>) -> Metric {
        Metric {
            id,
            source: self.source,
            metric_type: self.metric_type,
            value: self.value,
            timestamp,
        }
    }
}
