//! In-memory append-only metric log.
//!
//! Backends keep one `MetricLedger` behind a lock and use it for id and
//! timestamp assignment as well as page reads. Appending is split into
//! `stamp` (compute the record) and `commit` (make it visible) so a durable
//! backend can write the record out in between and drop it on failure
//! without burning an id.

use chrono::{DateTime, Utc};

use crate::error::{AroError, Result};
use crate::model::{Metric, NewMetric};
use crate::query::{paginate, Page, PageRequest};

#[derive(Debug, Default)]
pub struct MetricLedger {
    records: Vec<Metric>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MetricLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from previously persisted records (any order).
    ///
    /// Duplicate ids mean the backing log is corrupt and are rejected.
    pub fn from_records(mut records: Vec<Metric>) -> Result<Self> {
        records.sort_by_key(|m| m.id);
        if let Some(w) = records.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(AroError::Internal(format!(
                "duplicate metric id {} in store",
                w[0].id
            )));
        }
        let last_timestamp = records.iter().map(|m| m.timestamp).max();
        Ok(Self {
            records,
            last_timestamp,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id the next committed record will receive. Ids start at 1.
    pub fn next_id(&self) -> u64 {
        self.records.last().map(|m| m.id + 1).unwrap_or(1)
    }

    /// Assign id and timestamp without committing.
    ///
    /// The timestamp never goes below the newest committed one, so records
    /// created one after another keep non-decreasing timestamps even if the
    /// wall clock steps back.
    pub fn stamp(&self, draft: NewMetric, now: DateTime<Utc>) -> Metric {
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        draft.into_metric(self.next_id(), timestamp)
    }

    /// Make a stamped record visible to readers.
    pub fn commit(&mut self, metric: Metric) -> Result<()> {
        let expected = self.next_id();
        if metric.id != expected {
            return Err(AroError::Internal(format!(
                "out-of-order commit: id {} (expected {expected})",
                metric.id
            )));
        }
        if self.last_timestamp.map_or(true, |last| metric.timestamp > last) {
            self.last_timestamp = Some(metric.timestamp);
        }
        self.records.push(metric);
        Ok(())
    }

    pub fn page(&self, req: &PageRequest) -> Page<Metric> {
        paginate(&self.records, req)
    }

    pub fn records(&self) -> &[Metric] {
        &self.records
    }
}
