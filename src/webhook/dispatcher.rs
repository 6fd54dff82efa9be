// src/webhook/dispatcher.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::metrics::{FailureReason, ReloaderMetrics};
use crate::time::Sleeper;
use crate::webhook::retry::{AttemptOutcome, RetryMachine, RetryStep};
use crate::webhook::{WebhookDestination, WebhookRequest, WebhookTransport};

/// Final result of notifying one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded { attempts: u32, latency: Duration },
    /// The request could not be built; no attempt was made.
    RequestBuildFailed(String),
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Redacted destination URL.
    pub destination: String,
    pub outcome: DispatchOutcome,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Succeeded { .. })
    }
}

/// Async shell around [`RetryMachine`]: performs the attempts, sleeps the
/// backoff, and writes every signal to the metrics.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    transport: Arc<dyn WebhookTransport>,
    sleeper: Arc<dyn Sleeper>,
    metrics: Arc<ReloaderMetrics>,
    backoff: Duration,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn WebhookTransport>,
        sleeper: Arc<dyn Sleeper>,
        metrics: Arc<ReloaderMetrics>,
        backoff: Duration,
    ) -> Self {
        Self {
            transport,
            sleeper,
            metrics,
            backoff,
        }
    }

    /// Notify every destination in order. A failing destination never stops
    /// the ones after it.
    pub async fn notify(&self, destinations: &[WebhookDestination]) -> Vec<DispatchReport> {
        let mut reports = Vec::with_capacity(destinations.len());
        for destination in destinations {
            reports.push(self.notify_destination(destination).await);
        }
        reports
    }

    pub async fn notify_destination(&self, destination: &WebhookDestination) -> DispatchReport {
        let label = destination.label();

        let request = match WebhookRequest::build(destination) {
            Ok(request) => request,
            Err(err) => {
                self.metrics
                    .record_failure(label, FailureReason::ClientRequestCreate);
                error!(url = %label, error = %err, "could not build webhook request");
                return report(label, DispatchOutcome::RequestBuildFailed(err.to_string()));
            }
        };

        let begun = Instant::now();
        let mut machine = RetryMachine::new(destination.retries());
        let mut step = machine.start();

        loop {
            let attempt = match step {
                RetryStep::Attempt(n) => n,
                RetryStep::BackoffThenAttempt(n) => {
                    self.sleeper.sleep(self.backoff).await;
                    n
                }
                RetryStep::Succeeded { attempts } => {
                    let latency = begun.elapsed();
                    self.metrics.record_success(label, latency);
                    info!(url = %label, attempts, ?latency, "successfully triggered reload");
                    return report(label, DispatchOutcome::Succeeded { attempts, latency });
                }
                RetryStep::Exhausted { attempts } => {
                    self.metrics
                        .record_failure(label, FailureReason::RetriesExhausted);
                    error!(url = %label, attempts, "webhook reload retries exhausted");
                    return report(label, DispatchOutcome::Exhausted { attempts });
                }
            };

            info!(
                url = %label,
                attempt,
                max_attempts = machine.max_attempts(),
                "performing webhook request"
            );
            let outcome = self.attempt(&request, destination).await;
            step = machine.record(&outcome);
        }
    }

    async fn attempt(
        &self,
        request: &WebhookRequest,
        destination: &WebhookDestination,
    ) -> AttemptOutcome {
        let label = destination.label();
        let expected = destination.expected_status();

        match self.transport.execute(request).await {
            Err(err) => {
                self.metrics
                    .record_failure(label, FailureReason::ClientRequestDo);
                warn!(url = %label, error = %err, "webhook request failed");
                AttemptOutcome::TransportFailure(err.to_string())
            }
            Ok(status) => {
                self.metrics.record_status(label, status);
                if status != expected {
                    self.metrics
                        .record_failure(label, FailureReason::ClientResponse);
                    warn!(url = %label, status, expected, "unexpected webhook response code");
                    AttemptOutcome::UnexpectedStatus { status, expected }
                } else {
                    AttemptOutcome::Success { status }
                }
            }
        }
    }
}

fn report(label: &str, outcome: DispatchOutcome) -> DispatchReport {
    DispatchReport {
        destination: label.to_string(),
        outcome,
    }
}
