//! aro metric server.
//!
//! - `POST /api/metrics`, `GET /api/metrics` : metric ingest and paged reads
//! - `POST /api/anomalies/report`            : anomaly signal counter
//! - `/healthz`, `/readyz`, `/metrics`       : ops
//!
//! Config is read from `$ARO_CONFIG` (default `aro.yaml`); a missing file
//! means built-in defaults (in-memory store on 0.0.0.0:8080).

use tracing_subscriber::{fmt, EnvFilter};

use aro_core::error::{AroError, Result};
use aro_server::{app_state::AppState, config, router};

const DEFAULT_CONFIG_PATH: &str = "aro.yaml";

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.client_code().as_str(), "aro-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("ARO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_or_default(&path)?;
    let listen = cfg.server.socket_addr()?;

    let state = AppState::from_config(cfg).await?;
    let app = router::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| AroError::Internal(format!("failed to bind {listen}: {e}")))?;
    tracing::info!(%listen, "aro-server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| AroError::Internal(format!("server failed: {e}")))?;

    tracing::info!("aro-server stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    state.set_draining();
    tracing::info!("signal received, starting graceful shutdown");
}
