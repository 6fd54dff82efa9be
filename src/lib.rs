// src/lib.rs

pub mod archive;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod metrics;
pub mod time;
pub mod types;
pub mod watch;
pub mod webhook;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::engine::{Orchestrator, RunOutcome};
use crate::metrics::ReloaderMetrics;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - the orchestrator (initial extraction, watchers, dispatch loops)
/// - the metrics endpoint
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config = Arc::new(load_and_validate(&args)?);
    let metrics = Arc::new(ReloaderMetrics::new()?);

    let orchestrator = Orchestrator::new(Arc::clone(&config), Arc::clone(&metrics))?;
    let session = match orchestrator.start().await? {
        RunOutcome::InitCompleted => return Ok(()),
        RunOutcome::Watching(session) => session,
    };

    let shutdown = session.cancel_token();

    // Ctrl-C → graceful shutdown.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("shutdown requested");
            shutdown.cancel();
        });
    }

    let listener = match TcpListener::bind(config.listen_address()).await {
        Ok(listener) => listener,
        Err(err) => {
            session.shutdown().await;
            return Err(err).with_context(|| {
                format!("binding metrics endpoint on {}", config.listen_address())
            });
        }
    };

    let served = metrics::server::serve(
        listener,
        Arc::clone(&metrics),
        config.telemetry_path(),
        shutdown,
    )
    .await;

    session.shutdown().await;
    served?;
    Ok(())
}
