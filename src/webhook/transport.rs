// src/webhook/transport.rs

//! Pluggable HTTP transport.
//!
//! The dispatcher talks to a `WebhookTransport` instead of a concrete HTTP
//! client, so tests can script responses and transport failures without a
//! network. `ReqwestTransport` is the production implementation.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::errors::Result;
use crate::webhook::WebhookRequest;

/// No response was received (connect, DNS, TLS, timeout, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

pub trait WebhookTransport: Send + Sync + Debug {
    /// Send `request` and return the response status code.
    ///
    /// Implementations must release the response body before returning.
    fn execute<'a>(
        &'a self,
        request: &'a WebhookRequest,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<u16, TransportError>> + Send + 'a>>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl WebhookTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: &'a WebhookRequest,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<u16, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method.clone(), request.url.clone());
            if let Some(auth) = &request.basic_auth {
                builder = builder.basic_auth(&auth.username, Some(&auth.password));
            }

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError(e.to_string()))?;
            let status = response.status().as_u16();
            // Nothing reads the body; dropping the response closes it.
            drop(response);
            Ok(status)
        })
    }
}
