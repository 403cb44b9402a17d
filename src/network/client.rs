//! Privileged transport - direct reqwest call, no cross-origin policy

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::TransportError;
use crate::models::Response;
use crate::network::transport::{
    collect_headers, pretty_json, status_text, to_reqwest_method, OutgoingRequest, Transport,
};

pub struct PrivilegedTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl PrivilegedTransport {
    pub fn new(timeout: Duration) -> Self {
        PrivilegedTransport {
            client: create_client(timeout),
            timeout,
        }
    }

    fn build_request(&self, request: &OutgoingRequest) -> reqwest::RequestBuilder {
        let mut req_builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        req_builder
    }
}

#[async_trait]
impl Transport for PrivilegedTransport {
    fn name(&self) -> &'static str {
        "privileged"
    }

    async fn send(&self, request: &OutgoingRequest) -> Result<Response, TransportError> {
        let start = Instant::now();
        let resp = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, Some(self.timeout)))?;

        let status = resp.status();
        let headers = collect_headers(resp.headers());
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, Some(self.timeout)))?;
        let elapsed = start.elapsed().as_millis() as u64;

        Ok(Response {
            status: status.as_u16(),
            status_text: status_text(status),
            headers,
            body: pretty_json(&body).unwrap_or(body),
            response_time_ms: elapsed,
        })
    }
}

/// Create an HTTP client with the given request timeout
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client, falling back to defaults without a timeout");
            reqwest::Client::new()
        })
}
