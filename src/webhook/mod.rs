// src/webhook/mod.rs

//! Webhook notification.
//!
//! - [`destination`]: the configured targets and URL redaction.
//! - [`request`]: turns a destination into a body-less request with basic
//!   auth pulled out of the URL.
//! - [`retry`]: the pure per-destination retry state machine.
//! - [`transport`]: the HTTP seam (`reqwest` in production).
//! - [`dispatcher`]: the async shell driving all of the above.

pub mod destination;
pub mod dispatcher;
pub mod request;
pub mod retry;
pub mod transport;

pub use destination::{WebhookDestination, redact_url};
pub use dispatcher::{DispatchOutcome, DispatchReport, Dispatcher};
pub use request::{BasicAuth, WebhookRequest};
pub use retry::{AttemptOutcome, RetryMachine, RetryState, RetryStep};
pub use transport::{ReqwestTransport, TransportError, WebhookTransport};
