//! Lightweight in-process metrics.
//!
//! Series are stored as atomics, updated by the request-tracking middleware,
//! and rendered by the `/metrics` handler together with the anomaly counter.

pub mod metrics;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

pub use metrics::ServerMetrics;

/// Holds one unit of `http_in_flight` for a route until dropped, so a request
/// future cancelled mid-flight still releases its slot.
pub struct InFlightGuard {
    metrics: Arc<ServerMetrics>,
    route: String,
}

impl InFlightGuard {
    pub fn enter(metrics: Arc<ServerMetrics>, route: String) -> Self {
        metrics.http_in_flight.inc(&[("route", route.as_str())]);
        Self { metrics, route }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.metrics
            .http_in_flight
            .dec(&[("route", self.route.as_str())]);
    }
}

/// Per-request counters and latency, labelled by the matched route template.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = req.method().as_str().to_owned();
    let metrics = state.metrics();
    let started = Instant::now();

    let guard = InFlightGuard::enter(metrics.clone(), route.clone());
    let resp = next.run(req).await;
    drop(guard);

    let route = route.as_str();
    metrics.http_requests.inc(&[
        ("method", method.as_str()),
        ("route", route),
        ("status", resp.status().as_str()),
    ]);
    metrics.http_duration.observe(&[("route", route)], started.elapsed());
    resp
}
