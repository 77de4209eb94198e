//! Governed, non-failing reads.
//!
//! Every method here returns `None` instead of an error: a failed read means
//! "skip this subtree / this check" to the caller, never an abort.

use tracing::{debug, error};

use crate::contract::{HttpResponse, Transport};
use crate::governor::Governor;

pub struct Fetcher<'a, T: ?Sized> {
    transport: &'a T,
    governor: &'a Governor,
}

impl<'a, T: ?Sized> Clone for Fetcher<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T: ?Sized> Copy for Fetcher<'a, T> {}

impl<'a, T> Fetcher<'a, T>
where
    T: Transport + ?Sized,
{
    pub fn new(transport: &'a T, governor: &'a Governor) -> Self {
        Self {
            transport,
            governor,
        }
    }

    pub fn transport(&self) -> &'a T {
        self.transport
    }

    pub fn governor(&self) -> &'a Governor {
        self.governor
    }

    /// Raw governed `GET`. Only transport failures are logged here; the status
    /// is left for the caller to judge.
    pub async fn get(&self, url: &str) -> Option<HttpResponse> {
        let _permit = match self.governor.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(error = %e, url, "Governor closed, dropping request");
                return None;
            }
        };
        match self.transport.get(url).await {
            Ok(response) => Some(response),
            Err(e) => {
                error!(error = %e, url, "Request failed");
                None
            }
        }
    }

    /// JSON body of a 200 response.
    pub async fn fetch_json(&self, url: &str) -> Option<serde_json::Value> {
        let response = self.ok_response(url).await?;
        match serde_json::from_slice(&response.body) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(error = %e, url, "Failed to parse JSON response");
                None
            }
        }
    }

    /// Raw body of a 200 response.
    pub async fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>> {
        self.ok_response(url).await.map(|response| response.body)
    }

    async fn ok_response(&self, url: &str) -> Option<HttpResponse> {
        let response = self.get(url).await?;
        if response.is_ok() {
            debug!(url, bytes = response.body.len(), "Fetched");
            Some(response)
        } else {
            error!(url, status = response.status, "Failed to fetch");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{MockTransport, TransportError};
    use serde_json::json;

    #[tokio::test]
    async fn fetch_json_returns_parsed_body_on_200() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Ok(HttpResponse::json(200, &json!({"default_branch": "main"}))));
        let governor = Governor::new(1);
        let fetcher = Fetcher::new(&transport, &governor);

        let value = fetcher.fetch_json("https://api/repos/a/b").await.unwrap();
        assert_eq!(value["default_branch"], "main");
        assert_eq!(governor.available(), 1, "permit released after the call");
    }

    #[tokio::test]
    async fn non_200_statuses_are_absent() {
        for status in [201, 404, 500] {
            let mut transport = MockTransport::new();
            transport
                .expect_get()
                .returning(move |_| Ok(HttpResponse::new(status, "{}")));
            let governor = Governor::new(1);
            let fetcher = Fetcher::new(&transport, &governor);
            assert!(fetcher.fetch_json("u").await.is_none(), "status {status}");
            assert!(fetcher.fetch_bytes("u").await.is_none(), "status {status}");
        }
    }

    #[tokio::test]
    async fn transport_and_parse_errors_are_absent() {
        let mut transport = MockTransport::new();
        transport.expect_get().returning(|url| {
            if url.ends_with("broken") {
                Ok(HttpResponse::new(200, "not json"))
            } else {
                Err(TransportError::Request {
                    url: url.to_string(),
                    message: "connection reset".into(),
                })
            }
        });
        let governor = Governor::new(2);
        let fetcher = Fetcher::new(&transport, &governor);

        assert!(fetcher.fetch_json("https://api/broken").await.is_none());
        assert!(fetcher.fetch_json("https://api/down").await.is_none());
        assert!(fetcher.fetch_bytes("https://api/down").await.is_none());
        assert_eq!(governor.available(), 2);
    }

    #[tokio::test]
    async fn fetch_bytes_returns_raw_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Ok(HttpResponse::new(200, b"module top; endmodule\n".to_vec())));
        let governor = Governor::default();
        let fetcher = Fetcher::new(&transport, &governor);
        assert_eq!(
            fetcher.fetch_bytes("raw").await.unwrap(),
            b"module top; endmodule\n".to_vec()
        );
    }
}
