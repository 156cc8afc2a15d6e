//! HTTP contract tests driven through the router.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use aro_core::clock::Clock;
use aro_core::error::{AroError, Result};
use aro_core::{Metric, NewMetric, Page, PageRequest};
use aro_server::{
    app_state::AppState,
    config::AroConfig,
    router::build_router,
    store::{InMemoryMetricRepository, MetricRepository},
};

fn app() -> (Router, AppState) {
    let state = AppState::new(AroConfig::default(), Arc::new(InMemoryMetricRepository::new()));
    (build_router(state.clone()), state)
}

/// Fails queued appends in order, then behaves like the in-memory backend.
struct FlakyRepository {
    failures: Mutex<Vec<AroError>>,
    inner: InMemoryMetricRepository,
}

impl FlakyRepository {
    fn failing_with(mut failures: Vec<AroError>) -> Self {
        failures.reverse();
        Self {
            failures: Mutex::new(failures),
            inner: InMemoryMetricRepository::new(),
        }
    }
}

#[async_trait]
impl MetricRepository for FlakyRepository {
    fn backend(&self) -> &'static str {
        "flaky"
    }

    async fn append(&self, draft: NewMetric, clock: &dyn Clock) -> Result<Metric> {
        let failure = self.failures.lock().unwrap().pop();
        match failure {
            Some(e) => Err(e),
            None => self.inner.append(draft, clock).await,
        }
    }

    async fn find_page(&self, req: &PageRequest) -> Result<Page<Metric>> {
        self.inner.find_page(req).await
    }
}

fn flaky_app(failures: Vec<AroError>) -> (Router, AppState) {
    let repo = Arc::new(FlakyRepository::failing_with(failures));
    let state = AppState::new(AroConfig::default(), repo);
    (build_router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_metric(app: &Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/metrics")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn report_anomaly(app: &Router) -> StatusCode {
    let req = Request::builder()
        .method("POST")
        .uri("/api/anomalies/report")
        .body(Body::empty())
        .unwrap();
    send(app, req).await.0
}

#[tokio::test]
async fn create_assigns_id_and_timestamp() {
    let (app, _) = app();
    let before = Utc::now();
    let (status, m) = post_metric(&app, json!({"source": "host1", "type": "cpu", "value": 42.5})).await;
    let after = Utc::now();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["id"], 1);
    assert_eq!(m["source"], "host1");
    assert_eq!(m["type"], "cpu");
    assert_eq!(m["value"], 42.5);
    let ts: DateTime<Utc> = m["timestamp"].as_str().unwrap().parse().unwrap();
    assert!(before <= ts && ts <= after);

    let (status, page) = get_json(&app, "/api/metrics?page=0&size=10").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["totalElements"].as_u64().unwrap() >= 1);
    assert_eq!(page["content"][0], m);
}

#[tokio::test]
async fn client_id_and_timestamp_are_ignored() {
    let (app, _) = app();
    let (status, m) = post_metric(
        &app,
        json!({
            "id": 777,
            "source": "h",
            "type": "mem",
            "value": 1.0,
            "timestamp": "1999-01-01T00:00:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["id"], 1);
    assert_ne!(m["timestamp"], "1999-01-01T00:00:00Z");
}

#[tokio::test]
async fn empty_strings_are_accepted() {
    let (app, _) = app();
    let (status, m) = post_metric(&app, json!({"source": "", "type": "", "value": -0.5})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["source"], "");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (app, _) = app();
    let (status, err) = post_metric(&app, json!({"source": "h", "value": 1.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "BAD_REQUEST");

    let (status, err) = post_metric(&app, json!({"source": "h", "type": "t", "value": "high"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn default_listing_is_newest_first() {
    let (app, _) = app();
    for v in [1.0, 2.0, 3.0] {
        post_metric(&app, json!({"source": "h", "type": "t", "value": v})).await;
    }
    let (_, page) = get_json(&app, "/api/metrics").await;
    let ids: Vec<u64> = page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_u64().unwrap())
        .collect();
    // Equal timestamps fall back to id ascending, so only timestamp order is checked.
    let ts: Vec<DateTime<Utc>> = page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["timestamp"].as_str().unwrap().parse().unwrap())
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ts.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(page["size"], 100);
    assert_eq!(page["number"], 0);
}

#[tokio::test]
async fn explicit_sort_by_value() {
    let (app, _) = app();
    for v in [5.0, -1.0, 3.5] {
        post_metric(&app, json!({"source": "h", "type": "t", "value": v})).await;
    }
    let (_, page) = get_json(&app, "/api/metrics?sort=value,desc").await;
    let values: Vec<f64> = page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![5.0, 3.5, -1.0]);
}

#[tokio::test]
async fn bogus_sort_field_is_rejected() {
    let (app, _) = app();
    let (status, err) = get_json(&app, "/api/metrics?sort=bogus,asc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "INVALID_SORT_FIELD");
    assert!(err["message"].as_str().unwrap().contains("bogus"));
}

#[tokio::test]
async fn page_past_end_is_empty_not_error() {
    let (app, _) = app();
    for i in 0..5 {
        post_metric(&app, json!({"source": "h", "type": "t", "value": i})).await;
    }
    let (status, page) = get_json(&app, "/api/metrics?page=999&size=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["content"], json!([]));
    assert_eq!(page["totalElements"], 5);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["last"], true);
    assert_eq!(page["empty"], true);
}

#[tokio::test]
async fn invalid_page_params_are_rejected() {
    let (app, _) = app();
    for uri in [
        "/api/metrics?page=-1",
        "/api/metrics?size=0",
        "/api/metrics?size=abc",
        "/api/metrics?size=2001",
    ] {
        let (status, err) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri={uri}");
        assert_eq!(err["error"], "INVALID_PAGE_REQUEST", "uri={uri}");
    }
}

#[tokio::test]
async fn worker_sized_page_is_allowed() {
    let (app, _) = app();
    let (status, _) = get_json(&app, "/api/metrics?size=2000").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn anomaly_report_increments_counter() {
    let (app, state) = app();
    assert_eq!(state.anomalies().get(), 0);

    let req = Request::builder()
        .method("POST")
        .uri("/api/anomalies/report")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(report_anomaly(&app).await, StatusCode::OK);
    assert_eq!(state.anomalies().get(), 2);

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("# HELP aro_anomalies_detected_total Total number of anomalies detected by the ML worker."));
    assert!(text.contains("# TYPE aro_anomalies_detected_total counter"));
    assert!(text.contains("\naro_anomalies_detected_total 2\n"));
}

#[tokio::test]
async fn requests_are_tracked_by_route() {
    let (app, state) = app();
    get_json(&app, "/api/metrics").await;
    get_json(&app, "/api/metrics?sort=nope").await;

    let m = state.metrics();
    assert_eq!(
        m.http_requests.get(&[("method", "GET"), ("route", "/api/metrics"), ("status", "200")]),
        1
    );
    assert_eq!(
        m.http_requests.get(&[("method", "GET"), ("route", "/api/metrics"), ("status", "400")]),
        1
    );
    assert_eq!(m.http_duration.count(&[("route", "/api/metrics")]), 2);
}

#[tokio::test]
async fn health_and_readiness() {
    let (app, state) = app();
    assert_eq!(state.cfg().query.max_page_size, 2000);
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    let req = Request::builder().uri("/readyz").body(Body::empty()).unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    state.set_draining();
    let req = Request::builder().uri("/readyz").body(Body::empty()).unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unavailable_store_is_503_with_retry_after() {
    let (app, state) = flaky_app(vec![AroError::StoreUnavailable("disk gone".into())]);

    let req = Request::builder()
        .method("POST")
        .uri("/api/metrics")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"source": "h", "type": "t", "value": 1.0}).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.headers()[header::RETRY_AFTER], "1");
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let err: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(err["error"], "STORE_UNAVAILABLE");

    // The failed create left nothing behind and used up no id.
    let (_, page) = get_json(&app, "/api/metrics").await;
    assert_eq!(page["totalElements"], 0);
    let (status, m) = post_metric(&app, json!({"source": "h", "type": "t", "value": 2.0})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["id"], 1);

    let errors = &state.metrics().store_errors;
    assert_eq!(errors.get(&[("op", "create"), ("code", "STORE_UNAVAILABLE")]), 1);
}

#[tokio::test]
async fn client_rejections_are_not_store_errors() {
    let (app, state) = flaky_app(vec![AroError::InvalidMetric("value must be finite".into())]);

    let (status, err) = post_metric(&app, json!({"source": "h", "type": "t", "value": 1.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "INVALID_METRIC");

    let (status, _) = get_json(&app, "/api/metrics?size=2001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post_metric(&app, json!({"source": "h"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let errors = &state.metrics().store_errors;
    assert_eq!(errors.get(&[("op", "create"), ("code", "INVALID_METRIC")]), 0);
    assert_eq!(errors.get(&[("op", "query"), ("code", "INVALID_PAGE_REQUEST")]), 0);
    assert_eq!(errors.get(&[("op", "create"), ("code", "BAD_REQUEST")]), 0);
}

#[tokio::test]
async fn repeated_sort_params_read_as_field_then_direction() {
    let (app, _) = app();
    for v in [5.0, -1.0, 3.5] {
        post_metric(&app, json!({"source": "h", "type": "t", "value": v})).await;
    }
    for uri in ["/api/metrics?sort=value&sort=desc", "/api/metrics?sort=value,desc,ignored"] {
        let (status, page) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "uri={uri}");
        let values: Vec<f64> = page["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["value"].as_f64().unwrap())
            .collect();
        assert_eq!(values, vec![5.0, 3.5, -1.0], "uri={uri}");
    }
}
