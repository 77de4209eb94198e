#![doc = "GitHub transport for the CLI: bridges the core `Transport` trait to a real `reqwest` client."]
//
//! # GitHub Transport (CLI <-> Core)
//!
//! This module provides the production implementation of
//! [`verilog_mirror_core::contract::Transport`]. Every request carries the
//! GitHub v3 `Accept` header and a `User-Agent` (GitHub rejects requests
//! without one). When `GITHUB_TOKEN` is present in the environment it is sent
//! as a bearer credential; without it the pipeline still works, under the
//! lower unauthenticated rate limit.
//!
//! Status codes are passed through untouched: interpreting 404/409/5xx is the
//! pipeline's job, not the transport's.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::env;
use std::time::Duration;

pub use verilog_mirror_core::contract::{HttpResponse, Transport, TransportError};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GitHubClient {
    client: Client,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("verilog-mirror/", env!("CARGO_PKG_VERSION"))),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, token })
    }

    /// Builds a client, picking up `GITHUB_TOKEN` (after `.env` has been loaded).
    pub fn new_from_env() -> Result<Self, reqwest::Error> {
        let token = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        tracing::info!(
            authenticated = token.is_some(),
            "Initialized GitHubClient from environment"
        );
        if token.is_none() {
            tracing::warn!("GITHUB_TOKEN not set, using unauthenticated rate limits");
        }
        Self::new(token)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(url, status, bytes = body.len(), "GitHub response");
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl Transport for GitHubClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.send(url, self.client.get(url)).await
    }

    async fn put_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        self.send(url, self.client.put(url).json(body)).await
    }
}
