use axum::{extract::State, http::StatusCode};

use crate::app_state::AppState;

/// `POST /api/anomalies/report`: a bare signal, no body in or out.
pub async fn report(State(state): State<AppState>) -> StatusCode {
    let total = state.anomalies().report();
    tracing::info!(total, "anomaly reported");
    StatusCode::OK
}
