use async_trait::async_trait;
use tokio::sync::RwLock;

use aro_core::clock::Clock;
use aro_core::error::Result;
use aro_core::ledger::MetricLedger;
use aro_core::{Metric, NewMetric, Page, PageRequest};

use super::MetricRepository;

/// Process-local backend. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryMetricRepository {
    ledger: RwLock<MetricLedger>,
}

impl InMemoryMetricRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetricRepository for InMemoryMetricRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, draft: NewMetric, clock: &dyn Clock) -> Result<Metric> {
        let mut ledger = self.ledger.write().await;
        let metric = ledger.stamp(draft, clock.now());
        ledger.commit(metric.clone())?;
        Ok(metric)
    }

    async fn find_page(&self, req: &PageRequest) -> Result<Page<Metric>> {
        Ok(self.ledger.read().await.page(req))
    }
}
