//! Sandboxed transport - behaves like a page script calling `fetch`.
//!
//! The page is assumed to be served from `origin`. Requests to any other
//! origin follow the CORS rules a browser applies: an `Origin` header is
//! attached, non-simple requests are preflighted with `OPTIONS`, and the
//! server must answer with a matching `Access-Control-Allow-Origin` or the
//! exchange is rejected as a cross-origin restriction. Only safelisted and
//! explicitly exposed response headers are visible to the caller.

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_REQUEST_HEADERS,
    ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use reqwest::Url;

use crate::error::TransportError;
use crate::models::{HttpMethod, Response};
use crate::network::transport::{
    collect_headers, pretty_json, status_text, to_reqwest_method, OutgoingRequest, Transport,
};

const SAFELISTED_RESPONSE_HEADERS: &[&str] = &[
    "cache-control",
    "content-language",
    "content-length",
    "content-type",
    "expires",
    "last-modified",
    "pragma",
];

const SIMPLE_CONTENT_TYPES: &[&str] = &[
    "application/x-www-form-urlencoded",
    "multipart/form-data",
    "text/plain",
];

pub struct SandboxedTransport {
    client: reqwest::Client,
    origin: String,
}

impl SandboxedTransport {
    pub fn new(page_origin: &str) -> Result<Self, TransportError> {
        let url = Url::parse(page_origin)
            .map_err(|e| TransportError::InvalidRequest(format!("bad page origin: {}", e)))?;
        Ok(SandboxedTransport {
            client: reqwest::Client::new(),
            origin: url.origin().ascii_serialization(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn blocked(&self, target: &Url) -> TransportError {
        TransportError::CrossOrigin {
            origin: self.origin.clone(),
            target: target.origin().ascii_serialization(),
        }
    }

    async fn preflight(&self, target: &Url, request: &OutgoingRequest) -> Result<(), TransportError> {
        let unsafe_headers = non_safelisted_headers(request);
        let mut builder = self
            .client
            .request(reqwest::Method::OPTIONS, target.clone())
            .header(ORIGIN, &self.origin)
            .header(ACCESS_CONTROL_REQUEST_METHOD, request.method.as_str());
        if !unsafe_headers.is_empty() {
            builder = builder.header(ACCESS_CONTROL_REQUEST_HEADERS, unsafe_headers.join(","));
        }

        // only a reply that refuses the request is a cross-origin failure
        let resp = builder.send().await.map_err(|e| {
            tracing::debug!(error = %e, "Preflight could not be sent");
            TransportError::from_reqwest(&e, None)
        })?;

        let headers = resp.headers();
        let allowed = resp.status().is_success()
            && allows_origin(headers, &self.origin)
            && allows_method(headers, request.method)
            && unsafe_headers.iter().all(|h| allows_header(headers, h));
        if allowed {
            Ok(())
        } else {
            tracing::warn!(status = resp.status().as_u16(), url = %target, "Preflight rejected");
            Err(self.blocked(target))
        }
    }
}

#[async_trait]
impl Transport for SandboxedTransport {
    fn name(&self) -> &'static str {
        "sandboxed"
    }

    async fn send(&self, request: &OutgoingRequest) -> Result<Response, TransportError> {
        let target = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", request.url, e)))?;
        let cross_origin = target.origin().ascii_serialization() != self.origin;

        let start = Instant::now();
        if cross_origin && needs_preflight(request) {
            self.preflight(&target, request).await?;
        }

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), target.clone());
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if cross_origin {
            builder = builder.header(ORIGIN, &self.origin);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, None))?;

        if cross_origin && !allows_origin(resp.headers(), &self.origin) {
            tracing::warn!(url = %target, origin = %self.origin, "Response lacks a matching Access-Control-Allow-Origin");
            return Err(self.blocked(&target));
        }

        let status = resp.status();
        let headers = if cross_origin {
            visible_headers(resp.headers())
        } else {
            collect_headers(resp.headers())
        };
        let is_json = headers
            .get("content-type")
            .is_some_and(|ct| ct.contains("application/json"));
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, None))?;
        let elapsed = start.elapsed().as_millis() as u64;

        let body = if is_json {
            match pretty_json(&text) {
                Some(pretty) => pretty,
                None => {
                    tracing::warn!(url = %target, "Body declared JSON but did not parse, showing raw text");
                    text
                }
            }
        } else {
            text
        };

        Ok(Response {
            status: status.as_u16(),
            status_text: status_text(status),
            headers,
            body,
            response_time_ms: elapsed,
        })
    }
}

/// GET/HEAD/POST with only safelisted headers go out without a preflight
pub fn needs_preflight(request: &OutgoingRequest) -> bool {
    let simple_method = matches!(
        request.method,
        HttpMethod::GET | HttpMethod::HEAD | HttpMethod::POST
    );
    !simple_method || !non_safelisted_headers(request).is_empty()
}

/// Lower-cased, sorted names of request headers outside the CORS safelist
fn non_safelisted_headers(request: &OutgoingRequest) -> Vec<String> {
    let mut names: Vec<String> = request
        .headers
        .iter()
        .filter(|(key, value)| !is_safelisted_request_header(key, value))
        .map(|(key, _)| key.to_ascii_lowercase())
        .collect();
    names.sort();
    names.dedup();
    names
}

fn is_safelisted_request_header(key: &str, value: &str) -> bool {
    match key.to_ascii_lowercase().as_str() {
        "accept" | "accept-language" | "content-language" => true,
        "content-type" => {
            let essence = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            SIMPLE_CONTENT_TYPES.contains(&essence.as_str())
        }
        _ => false,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: reqwest::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn list_contains(headers: &HeaderMap, name: reqwest::header::HeaderName, wanted: &str) -> bool {
    header_str(headers, name).is_some_and(|list| {
        list.split(',')
            .map(str::trim)
            .any(|item| item == "*" || item.eq_ignore_ascii_case(wanted))
    })
}

fn allows_origin(headers: &HeaderMap, origin: &str) -> bool {
    matches!(header_str(headers, ACCESS_CONTROL_ALLOW_ORIGIN), Some(v) if v == "*" || v == origin)
}

fn allows_method(headers: &HeaderMap, method: HttpMethod) -> bool {
    matches!(method, HttpMethod::GET | HttpMethod::HEAD | HttpMethod::POST)
        || list_contains(headers, ACCESS_CONTROL_ALLOW_METHODS, method.as_str())
}

fn allows_header(headers: &HeaderMap, name: &str) -> bool {
    list_contains(headers, ACCESS_CONTROL_ALLOW_HEADERS, name)
}

/// Response headers a cross-origin script may read
fn visible_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let exposed: Vec<String> = header_str(headers, ACCESS_CONTROL_EXPOSE_HEADERS)
        .map(|list| {
            list.split(',')
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let expose_all = exposed.iter().any(|h| h == "*");

    collect_headers(headers)
        .into_iter()
        .filter(|(name, _)| {
            expose_all
                || SAFELISTED_RESPONSE_HEADERS.contains(&name.as_str())
                || exposed.contains(name)
        })
        .collect()
}
