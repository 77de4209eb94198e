//! # contract: the HTTP seam of the pipeline
//!
//! Every network exchange the pipeline performs goes through the [`Transport`]
//! trait. The CLI crate implements it with a `reqwest` client carrying the
//! GitHub headers and credential; tests use the generated `MockTransport`.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, and the mock is exported behind the
//!   `test-export-mocks` feature so integration tests in other crates can use it.
//!
//! ## Contract
//! - A transport only reports what happened on the wire. Any HTTP status,
//!   including 4xx/5xx, is an `Ok(HttpResponse)`; `Err` is reserved for
//!   failures where no response was obtained (connect, timeout, body read).
//! - Interpretation of status codes belongs to the callers (fetcher, uploader).

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Response whose body is the serialized JSON value.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body as text, for diagnostics.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failure to obtain any response at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("reading response body from {url} failed: {message}")]
    Body { url: String, message: String },
}

/// Raw HTTP access used by the pipeline.
///
/// The trait is `Send` + `Sync` so one transport can be shared by every
/// concurrently running walk and upload future.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET url`, returning status and body bytes.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// `PUT url` with a JSON body, returning status and body bytes.
    async fn put_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError>;
}
