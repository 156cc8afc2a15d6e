//! Shared application state for the aro server.
//!
//! Owns the metric store, the anomaly counter and the HTTP metrics registry.
//! Everything is created once at startup and cloned cheaply into handlers.

use std::sync::Arc;

use aro_core::error::Result;

use crate::config::AroConfig;
use crate::obs::ServerMetrics;
use crate::services::{AnomalyCounter, MetricStore, QueryLimits};
use crate::store::{self, MetricRepository};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    store: Arc<MetricStore>,
    anomalies: Arc<AnomalyCounter>,
    metrics: Arc<ServerMetrics>,
}

struct AppStateInner {
    cfg: AroConfig,
}

impl AppState {
    /// Build state around an already opened repository.
    pub fn new(cfg: AroConfig, repo: Arc<dyn MetricRepository>) -> Self {
        let store = MetricStore::new(repo, QueryLimits::from(&cfg.query));
        Self::with_store(cfg, store)
    }

    pub fn with_store(cfg: AroConfig, store: MetricStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            store: Arc::new(store),
            anomalies: Arc::new(AnomalyCounter::new()),
            metrics: Arc::new(ServerMetrics::default()),
        }
    }

    /// Open the configured backend and build state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub async fn from_config(cfg: AroConfig) -> Result<Self> {
        let repo = store::open(&cfg.store).await?;
        tracing::info!(backend = repo.backend(), "metric store ready");
        Ok(Self::new(cfg, repo))
    }

    pub fn cfg(&self) -> &AroConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<MetricStore> {
        Arc::clone(&self.store)
    }

    pub fn anomalies(&self) -> Arc<AnomalyCounter> {
        Arc::clone(&self.anomalies)
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Full `/metrics` exposition body.
    pub fn render_metrics(&self) -> String {
        let mut out = String::new();
        self.anomalies.render(&mut out);
        self.metrics.render(&mut out);
        out
    }
}
