use std::sync::Arc;

use aro_core::clock::{Clock, SystemClock};
use aro_core::error::{AroError, Result};
use aro_core::{Metric, NewMetric, Page, PageRequest, Sort};

use crate::config::QuerySection;
use crate::store::MetricRepository;

/// Page size bounds applied to incoming queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        QueryLimits::from(&QuerySection::default())
    }
}

impl From<&QuerySection> for QueryLimits {
    fn from(q: &QuerySection) -> Self {
        Self {
            default_page_size: q.default_page_size,
            max_page_size: q.max_page_size,
        }
    }
}

/// Raw, still-unvalidated page parameters as they arrive from a caller.
#[derive(Debug, Clone, Default)]
pub struct PageParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

/// Validation, timestamping and paging over a `MetricRepository`.
pub struct MetricStore {
    repo: Arc<dyn MetricRepository>,
    clock: Arc<dyn Clock>,
    limits: QueryLimits,
}

impl MetricStore {
    pub fn new(repo: Arc<dyn MetricRepository>, limits: QueryLimits) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock), limits)
    }

    pub fn with_clock(
        repo: Arc<dyn MetricRepository>,
        clock: Arc<dyn Clock>,
        limits: QueryLimits,
    ) -> Self {
        Self { repo, clock, limits }
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    /// Persist a new metric. Any client id/timestamp on `draft` is discarded.
    pub async fn create(&self, draft: NewMetric) -> Result<Metric> {
        draft.validate()?;
        let metric = self.repo.append(draft, self.clock.as_ref()).await?;
        tracing::debug!(
            id = metric.id,
            source = %metric.source,
            metric_type = %metric.metric_type,
            backend = self.repo.backend(),
            "metric stored"
        );
        Ok(metric)
    }

    /// Fetch one page, rejecting sizes above the configured cap.
    pub async fn query(&self, req: PageRequest) -> Result<Page<Metric>> {
        if req.size > self.limits.max_page_size {
            return Err(AroError::InvalidPageRequest(format!(
                "size must not exceed {}",
                self.limits.max_page_size
            )));
        }
        self.repo.find_page(&req).await
    }

    /// Turn raw parameters into a `PageRequest`, filling in defaults.
    pub fn page_request(&self, params: &PageParams) -> Result<PageRequest> {
        let page = match params.page.as_deref() {
            None | Some("") => 0,
            Some(p) => p.trim().parse::<usize>().map_err(|_| {
                AroError::InvalidPageRequest(format!(
                    "page must be a non-negative integer, got {p:?}"
                ))
            })?,
        };
        let size = match params.size.as_deref() {
            None | Some("") => self.limits.default_page_size,
            Some(s) => s.trim().parse::<usize>().map_err(|_| {
                AroError::InvalidPageRequest(format!("size must be a positive integer, got {s:?}"))
            })?,
        };
        let sort = match params.sort.as_deref() {
            None | Some("") => Sort::default(),
            Some(s) => Sort::parse(s)?,
        };
        PageRequest::new(page, size, sort)
    }
}
