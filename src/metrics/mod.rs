// src/metrics/mod.rs

//! Prometheus collectors written to by the watch loops and the webhook
//! dispatcher, plus the HTTP endpoint that serves them ([`server`]).
//!
//! All collectors live in one registry owned by [`ReloaderMetrics`]; the
//! collectors are atomic, so a single `Arc<ReloaderMetrics>` is shared by
//! every task without further locking.

pub mod server;

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

use crate::errors::Result;

/// Prefix applied to every metric name.
pub const NAMESPACE: &str = "config_reloader";

/// Categorized reason attached to a failure signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The request could not be built (e.g. invalid method).
    ClientRequestCreate,
    /// Transport-level failure: connect, DNS, TLS, timeout.
    ClientRequestDo,
    /// A response arrived with an unexpected status code.
    ClientResponse,
    /// No attempt succeeded within the retry budget.
    RetriesExhausted,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ClientRequestCreate => "client_request_create",
            FailureReason::ClientRequestDo => "client_request_do",
            FailureReason::ClientResponse => "client_response",
            FailureReason::RetriesExhausted => "retries_exhausted",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ReloaderMetrics {
    registry: Registry,
    watcher_errors: IntCounter,
    requests: IntCounterVec,
    request_errors: IntCounterVec,
    successful_reloads: IntCounterVec,
    request_duration: HistogramVec,
    last_reload_error: GaugeVec,
    last_reload_success_timestamp: GaugeVec,
}

impl fmt::Debug for ReloaderMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloaderMetrics").finish_non_exhaustive()
    }
}

impl ReloaderMetrics {
    pub fn new() -> Result<Self> {
        let registry =
            Registry::new_custom(Some(NAMESPACE.to_string()), None).map_err(anyhow::Error::from)?;

        let watcher_errors = IntCounter::new(
            "watcher_errors_total",
            "Total filesystem watcher errors",
        )
        .map_err(anyhow::Error::from)?;

        let requests = IntCounterVec::new(
            Opts::new("requests_total", "Total webhook responses by status code"),
            &["url", "status_code"],
        )
        .map_err(anyhow::Error::from)?;

        let request_errors = IntCounterVec::new(
            Opts::new("request_errors_total", "Total webhook failures by reason"),
            &["url", "reason"],
        )
        .map_err(anyhow::Error::from)?;

        let successful_reloads = IntCounterVec::new(
            Opts::new("successful_reloads_total", "Total successfully triggered reloads"),
            &["url"],
        )
        .map_err(anyhow::Error::from)?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "request_duration_seconds",
                "Time from the first attempt until a successful webhook response",
            ),
            &["url"],
        )
        .map_err(anyhow::Error::from)?;

        let last_reload_error = GaugeVec::new(
            Opts::new(
                "last_reload_error",
                "1 if the last webhook signal for a destination was a failure, 0 otherwise",
            ),
            &["url"],
        )
        .map_err(anyhow::Error::from)?;

        let last_reload_success_timestamp = GaugeVec::new(
            Opts::new(
                "last_reload_successful_timestamp_seconds",
                "Unix time of the last successful reload per destination",
            ),
            &["url"],
        )
        .map_err(anyhow::Error::from)?;

        registry
            .register(Box::new(watcher_errors.clone()))
            .map_err(anyhow::Error::from)?;
        registry
            .register(Box::new(requests.clone()))
            .map_err(anyhow::Error::from)?;
        registry
            .register(Box::new(request_errors.clone()))
            .map_err(anyhow::Error::from)?;
        registry
            .register(Box::new(successful_reloads.clone()))
            .map_err(anyhow::Error::from)?;
        registry
            .register(Box::new(request_duration.clone()))
            .map_err(anyhow::Error::from)?;
        registry
            .register(Box::new(last_reload_error.clone()))
            .map_err(anyhow::Error::from)?;
        registry
            .register(Box::new(last_reload_success_timestamp.clone()))
            .map_err(anyhow::Error::from)?;

        Ok(Self {
            registry,
            watcher_errors,
            requests,
            request_errors,
            successful_reloads,
            request_duration,
            last_reload_error,
            last_reload_success_timestamp,
        })
    }

    pub fn record_watcher_error(&self) {
        self.watcher_errors.inc();
    }

    pub fn record_status(&self, url: &str, status: u16) {
        let status = status.to_string();
        self.requests
            .with_label_values(&[url, status.as_str()])
            .inc();
    }

    pub fn record_failure(&self, url: &str, reason: FailureReason) {
        self.request_errors
            .with_label_values(&[url, reason.as_str()])
            .inc();
        self.last_reload_error.with_label_values(&[url]).set(1.0);
    }

    pub fn record_success(&self, url: &str, latency: Duration) {
        self.successful_reloads.with_label_values(&[url]).inc();
        self.request_duration
            .with_label_values(&[url])
            .observe(latency.as_secs_f64());
        self.last_reload_error.with_label_values(&[url]).set(0.0);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        self.last_reload_success_timestamp
            .with_label_values(&[url])
            .set(now);
    }

    pub fn watcher_errors(&self) -> u64 {
        self.watcher_errors.get()
    }

    pub fn status_count(&self, url: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.requests
            .with_label_values(&[url, status.as_str()])
            .get()
    }

    pub fn failure_count(&self, url: &str, reason: FailureReason) -> u64 {
        self.request_errors
            .with_label_values(&[url, reason.as_str()])
            .get()
    }

    pub fn success_count(&self, url: &str) -> u64 {
        self.successful_reloads.with_label_values(&[url]).get()
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(anyhow::Error::from)?;
        let text = String::from_utf8(buffer).map_err(anyhow::Error::from)?;
        Ok(text)
    }
}
