//! Anomaly signal counter.
//!
//! One instance is created at startup and shared through `AppState`. The value
//! starts at zero, only ever grows by one per report, and lives in memory, so
//! it resets only when the process restarts.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Exported series name.
pub const ANOMALY_COUNTER_NAME: &str = "aro_anomalies_detected_total";
/// Exported help text.
pub const ANOMALY_COUNTER_HELP: &str = "Total number of anomalies detected by the ML worker.";

#[derive(Debug, Default)]
pub struct AnomalyCounter {
    total: AtomicU64,
}

impl AnomalyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one anomaly signal. Returns the total after this report.
    pub fn report(&self) -> u64 {
        self.total.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {ANOMALY_COUNTER_NAME} {ANOMALY_COUNTER_HELP}");
        let _ = writeln!(out, "# TYPE {ANOMALY_COUNTER_NAME} counter");
        let _ = writeln!(out, "{ANOMALY_COUNTER_NAME} {}", self.get());
    }
}
