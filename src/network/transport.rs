//! Transport capability - one HTTP exchange, normalized into a `Response`

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::config::{Config, TransportMode};
use crate::constants::DEFAULT_SANDBOX_ORIGIN;
use crate::error::TransportError;
use crate::models::{HttpMethod, Request, Response};
use crate::network::client::PrivilegedTransport;
use crate::network::sandbox::SandboxedTransport;

/// What actually goes on the wire for one dispatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl OutgoingRequest {
    pub fn from_draft(draft: &Request) -> Self {
        OutgoingRequest {
            method: draft.method,
            url: draft.url.trim().to_string(),
            headers: draft.transmitted_headers(),
            body: draft.transmitted_body(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes a single request attempt. Any status code is a successful
/// exchange; only network-level failure is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, request: &OutgoingRequest) -> Result<Response, TransportError>;
}

/// Build the transport selected by the configuration
///
/// A bad page origin falls back to the default one instead of failing startup.
pub fn from_config(config: &Config) -> Result<Arc<dyn Transport>, TransportError> {
    match config.transport {
        TransportMode::Privileged => Ok(Arc::new(PrivilegedTransport::new(
            std::time::Duration::from_secs(config.timeout_secs.max(1)),
        ))),
        TransportMode::Sandboxed => {
            let transport = SandboxedTransport::new(&config.sandbox_origin).or_else(|e| {
                tracing::warn!(origin = %config.sandbox_origin, error = %e, "Bad sandbox origin, using the default");
                SandboxedTransport::new(DEFAULT_SANDBOX_ORIGIN)
            })?;
            Ok(Arc::new(transport))
        }
    }
}

pub(crate) fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

/// Lower-cased header map; repeated headers are joined with ", "
pub(crate) fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<invalid>");
        out.entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    out
}

/// Pretty-print (2-space indent) if the text is JSON
pub fn pretty_json(text: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

pub(crate) fn status_text(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Header;
    use reqwest::header::{HeaderValue, SET_COOKIE};

    #[test]
    fn test_outgoing_from_draft() {
        let mut draft = Request::new(HttpMethod::GET, "  https://example.test/  ");
        draft.set_headers(vec![Header::new("a", "1"), Header::new("b", ""), Header::blank()]);
        draft.body = "ignored".to_string();

        let out = OutgoingRequest::from_draft(&draft);
        assert_eq!(out.url, "https://example.test/");
        assert_eq!(out.headers, vec![("a".to_string(), "1".to_string())]);
        assert_eq!(out.body, None);
        assert_eq!(out.header("A"), Some("1"));
    }

    #[test]
    fn test_from_config_survives_bad_origin() {
        let config = Config {
            transport: TransportMode::Sandboxed,
            sandbox_origin: "nope".to_string(),
            ..Config::default()
        };
        let transport = from_config(&config).unwrap();
        assert_eq!(transport.name(), "sandboxed");
    }

    #[test]
    fn test_pretty_json() {
        assert_eq!(pretty_json("{\"a\":[1]}").as_deref(), Some("{\n  \"a\": [\n    1\n  ]\n}"));
        assert_eq!(pretty_json("<html>"), None);
        assert_eq!(pretty_json(""), None);
    }

    #[test]
    fn test_collect_headers_joins_repeats() {
        let mut map = HeaderMap::new();
        map.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        map.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        map.insert("X-Trace", HeaderValue::from_static("abc"));

        let headers = collect_headers(&map);
        assert_eq!(headers.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
        assert_eq!(headers.get("x-trace").map(String::as_str), Some("abc"));
    }
}
