// tests/webhook_http.rs

mod common;
use crate::common::{TestResult, init_tracing, metrics, with_timeout};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::routing::any;
use tokio::net::TcpListener;
use url::Url;

use config_reloader::metrics::FailureReason;
use config_reloader::time::TokioSleeper;
use config_reloader::webhook::{
    DispatchOutcome, Dispatcher, ReqwestTransport, WebhookDestination, WebhookRequest,
    WebhookTransport,
};

#[derive(Debug, Clone, Default)]
struct Seen {
    calls: Arc<Mutex<Vec<(Method, Option<String>)>>>,
}

async fn record(State(seen): State<Seen>, method: Method, headers: HeaderMap) -> StatusCode {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.calls.lock().unwrap().push((method, auth));
    StatusCode::OK
}

async fn teapot() -> StatusCode {
    StatusCode::IM_A_TEAPOT
}

/// Start a local webhook receiver and return its base URL.
async fn spawn_receiver(seen: Seen) -> Result<String, std::io::Error> {
    let app = Router::new()
        .route("/reload", any(record))
        .route("/teapot", any(teapot))
        .with_state(seen);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn reqwest_transport_sends_method_and_basic_auth() -> TestResult {
    init_tracing();
    let seen = Seen::default();
    let base = spawn_receiver(seen.clone()).await?;

    let url = Url::parse(&format!("{base}/reload"))?;
    let mut with_creds = url.clone();
    with_creds.set_username("admin").unwrap();
    with_creds.set_password(Some("secret")).unwrap();

    let dest = WebhookDestination::new(with_creds, "PUT", 200, 1);
    let request = WebhookRequest::build(&dest)?;
    let transport = ReqwestTransport::new(Duration::from_secs(5))?;

    let status = with_timeout(transport.execute(&request)).await?;
    assert_eq!(status, 200);

    let calls = seen.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Method::PUT);
    // base64("admin:secret")
    assert_eq!(calls[0].1.as_deref(), Some("Basic YWRtaW46c2VjcmV0"));
    Ok(())
}

#[tokio::test]
async fn unexpected_status_is_retried_and_counted() -> TestResult {
    init_tracing();
    let base = spawn_receiver(Seen::default()).await?;
    let metrics = metrics();
    let dispatcher = Dispatcher::new(
        Arc::new(ReqwestTransport::new(Duration::from_secs(5))?),
        Arc::new(TokioSleeper),
        Arc::clone(&metrics),
        Duration::from_millis(10),
    );

    let dest = WebhookDestination::new(Url::parse(&format!("{base}/teapot"))?, "POST", 200, 2);
    let report = with_timeout(dispatcher.notify_destination(&dest)).await;

    assert_eq!(report.outcome, DispatchOutcome::Exhausted { attempts: 2 });
    assert_eq!(metrics.status_count(dest.label(), 418), 2);
    assert_eq!(
        metrics.failure_count(dest.label(), FailureReason::ClientResponse),
        2
    );
    Ok(())
}

#[tokio::test]
async fn connection_refused_is_a_transport_failure() -> TestResult {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let metrics = metrics();
    let dispatcher = Dispatcher::new(
        Arc::new(ReqwestTransport::new(Duration::from_secs(2))?),
        Arc::new(TokioSleeper),
        Arc::clone(&metrics),
        Duration::ZERO,
    );
    let dest = WebhookDestination::new(Url::parse(&format!("http://{addr}/reload"))?, "POST", 200, 1);
    let report = with_timeout(dispatcher.notify_destination(&dest)).await;

    assert_eq!(report.outcome, DispatchOutcome::Exhausted { attempts: 1 });
    assert_eq!(
        metrics.failure_count(dest.label(), FailureReason::ClientRequestDo),
        1
    );
    Ok(())
}
