// src/metrics/server.rs

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::errors::Result;
use crate::metrics::ReloaderMetrics;

const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Build the router exposing `metrics` under `path`.
pub fn router(metrics: Arc<ReloaderMetrics>, path: &str) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

/// Serve metrics on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    metrics: Arc<ReloaderMetrics>,
    path: &str,
    shutdown: CancellationToken,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, path, "metrics endpoint listening");
    }
    axum::serve(listener, router(metrics, path))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    info!("metrics endpoint stopped");
    Ok(())
}

async fn metrics_handler(State(metrics): State<Arc<ReloaderMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Err(err) => {
            error!(error = %err, "could not encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
