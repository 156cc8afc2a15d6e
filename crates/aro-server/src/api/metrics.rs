use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};

use aro_core::error::{AroError, ClientCode, Result};
use aro_core::{Metric, NewMetric, Page};

use crate::api::ApiError;
use crate::app_state::AppState;
use crate::services::PageParams;

/// `GET /api/metrics` query string. Values stay raw so bad input maps to
/// `INVALID_PAGE_REQUEST` / `INVALID_SORT_FIELD` instead of a generic 400.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    /// Collect raw `key=value` pairs.
    ///
    /// Repeated `sort` keys are joined with `,`, so `sort=value&sort=desc`
    /// reads the same as `sort=value,desc`. Repeated `page`/`size` are
    /// rejected; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self> {
        let mut q = ListQuery::default();
        let mut sort: Vec<String> = Vec::new();
        for (k, v) in pairs {
            let slot = match k.as_str() {
                "page" => &mut q.page,
                "size" => &mut q.size,
                "sort" => {
                    sort.push(v);
                    continue;
                }
                _ => continue,
            };
            if slot.replace(v).is_some() {
                return Err(AroError::InvalidPageRequest(format!(
                    "duplicate query parameter: {k}"
                )));
            }
        }
        if !sort.is_empty() {
            q.sort = Some(sort.join(","));
        }
        Ok(q)
    }
}

impl From<ListQuery> for PageParams {
    fn from(q: ListQuery) -> Self {
        PageParams {
            page: q.page,
            size: q.size,
            sort: q.sort,
        }
    }
}

/// Only persistence-layer failures count toward `aro_store_errors_total`.
fn store_failure(state: &AppState, op: &str, e: AroError) -> ApiError {
    let code = e.client_code();
    if matches!(code, ClientCode::StoreUnavailable | ClientCode::Internal) {
        state
            .metrics()
            .store_errors
            .inc(&[("op", op), ("code", code.as_str())]);
    }
    ApiError(e)
}

/// `POST /api/metrics`
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewMetric>, JsonRejection>,
) -> std::result::Result<Json<Metric>, ApiError> {
    let Json(draft) = body.map_err(|e| AroError::BadRequest(e.body_text()))?;
    let metric = state
        .store()
        .create(draft)
        .await
        .map_err(|e| store_failure(&state, "create", e))?;

    tracing::info!(id = metric.id, source = %metric.source, metric_type = %metric.metric_type, "metric created");
    Ok(Json(metric))
}

/// `GET /api/metrics?page=&size=&sort=field,dir`
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> std::result::Result<Json<Page<Metric>>, ApiError> {
    let Query(pairs) = query.map_err(|e| AroError::BadRequest(e.body_text()))?;
    let query = ListQuery::from_pairs(pairs)?;
    let store = state.store();
    let req = store.page_request(&PageParams::from(query))?;
    let page = store
        .query(req)
        .await
        .map_err(|e| store_failure(&state, "query", e))?;

    tracing::debug!(
        page = req.page,
        size = req.size,
        sort = %req.sort,
        returned = page.number_of_elements,
        total = page.total_elements,
        "metrics listed"
    );
    Ok(Json(page))
}
