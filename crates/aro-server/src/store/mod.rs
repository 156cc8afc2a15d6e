//! Metric persistence backends.
//!
//! The store is reached only through `MetricRepository` so the service layer
//! does not care whether records live in memory or in a file on disk.

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use aro_core::clock::Clock;
use aro_core::error::Result;
use aro_core::{Metric, NewMetric, Page, PageRequest};

use crate::config::{StoreBackend, StoreSection};

pub use file::FileMetricRepository;
pub use memory::InMemoryMetricRepository;

/// Append-only metric collection keyed by id.
#[async_trait]
pub trait MetricRepository: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Assign id and timestamp (read from `clock` while holding the append
    /// path), persist, then return the stored record. Either the record is
    /// fully committed or nothing changes.
    async fn append(&self, draft: NewMetric, clock: &dyn Clock) -> Result<Metric>;

    /// One page of the full order described by `req.sort`.
    async fn find_page(&self, req: &PageRequest) -> Result<Page<Metric>>;
}

/// Open the backend selected in config.
pub async fn open(cfg: &StoreSection) -> Result<Arc<dyn MetricRepository>> {
    match cfg.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryMetricRepository::new())),
        StoreBackend::File => {
            let path = cfg.path.as_deref().unwrap_or_default();
            Ok(Arc::new(FileMetricRepository::open(path).await?))
        }
    }
}
