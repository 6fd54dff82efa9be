// src/webhook/request.rs

use std::fmt;

use reqwest::Method;
use url::Url;

use crate::errors::{ReloaderError, Result};
use crate::webhook::WebhookDestination;

/// Credentials sent as an `Authorization: Basic` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A body-less webhook request, ready to hand to a transport.
///
/// The URL never carries user-info: credentials found in the configured URL
/// move to `basic_auth` when a password is present and are dropped
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRequest {
    pub method: Method,
    pub url: Url,
    pub basic_auth: Option<BasicAuth>,
}

impl WebhookRequest {
    pub fn build(destination: &WebhookDestination) -> Result<Self> {
        let method = parse_method(destination.method())?;

        let source = destination.url();
        let basic_auth = source.password().map(|password| BasicAuth {
            username: decode(source.username()),
            password: decode(password),
        });

        let mut url = source.clone();
        if url.set_username("").is_err() || url.set_password(None).is_err() {
            return Err(ReloaderError::RequestBuild(format!(
                "cannot strip credentials from '{}'",
                destination.label()
            )));
        }

        Ok(Self {
            method,
            url,
            basic_auth,
        })
    }
}

fn parse_method(raw: &str) -> Result<Method> {
    // An empty method means GET, as for most HTTP clients.
    if raw.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(raw.as_bytes())
        .map_err(|_| ReloaderError::RequestBuild(format!("invalid HTTP method '{raw}'")))
}

fn decode(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}
