use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use config_reloader::time::Sleeper;
use config_reloader::webhook::{TransportError, WebhookRequest, WebhookTransport};

/// A fake transport that:
/// - records every request it is handed
/// - answers from a script, front to back
/// - answers `fallback` once the script is used up.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Result<u16, TransportError>>>>,
    fallback: Result<u16, TransportError>,
    requests: Arc<Mutex<Vec<WebhookRequest>>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<u16, TransportError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fallback: Ok(200),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with `status`.
    pub fn always(status: u16) -> Self {
        Self::new(Vec::new()).with_fallback(Ok(status))
    }

    /// Always fail at the transport level.
    pub fn unreachable() -> Self {
        Self::new(Vec::new()).with_fallback(Err(TransportError("connection refused".into())))
    }

    pub fn with_fallback(mut self, fallback: Result<u16, TransportError>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn requests(&self) -> Vec<WebhookRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of requests whose URL starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.as_str().starts_with(prefix))
            .count()
    }
}

impl WebhookTransport for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        request: &'a WebhookRequest,
    ) -> Pin<Box<dyn Future<Output = Result<u16, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        })
    }
}

/// A sleeper that returns immediately and records every requested duration.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.sleeps.lock().unwrap().push(duration);
        Box::pin(tokio::task::yield_now())
    }
}
