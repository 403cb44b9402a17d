use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// Next method in selector order, wrapping around
    pub fn next(&self) -> HttpMethod {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unsupported HTTP method: {}", s))
    }
}

/// One editable header row. Either side may be blank while editing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Header {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn blank() -> Self {
        Header::default()
    }

    /// A row is sent only when both sides are non-blank after trimming
    pub fn is_transmittable(&self) -> bool {
        !self.key.trim().is_empty() && !self.value.trim().is_empty()
    }
}

/// The request being edited (the draft).
///
/// Always holds at least one header row so the editor never renders empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub method: HttpMethod,
    pub url: String,
    headers: Vec<Header>,
    pub body: String,
}

impl Default for Request {
    fn default() -> Self {
        Request {
            method: HttpMethod::GET,
            url: String::new(),
            headers: vec![Header::blank()],
            body: String::new(),
        }
    }
}

impl Request {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Request {
            method,
            url: url.into(),
            ..Request::default()
        }
    }

    /// Draft loaded from a history entry. History keeps no headers or body.
    pub fn from_history(item: &HistoryItem) -> Self {
        Request::new(item.method, item.url.clone())
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn header_mut(&mut self, index: usize) -> Option<&mut Header> {
        self.headers.get_mut(index)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self.headers.last_mut() {
            Some(last) if *last == Header::blank() => *last = Header::new(key, value),
            _ => self.headers.push(Header::new(key, value)),
        }
        self
    }

    pub fn add_header(&mut self) -> usize {
        self.headers.push(Header::blank());
        self.headers.len() - 1
    }

    /// Removes a row; removing the only row leaves a single blank one
    pub fn remove_header(&mut self, index: usize) {
        if index < self.headers.len() {
            self.headers.remove(index);
        }
        if self.headers.is_empty() {
            self.headers.push(Header::blank());
        }
    }

    pub fn set_headers(&mut self, headers: Vec<Header>) {
        self.headers = headers;
        if self.headers.is_empty() {
            self.headers.push(Header::blank());
        }
    }

    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Header mapping as sent on the wire.
    ///
    /// Rows with a blank key or value are dropped entirely. Keys and values
    /// are trimmed. Keys compare case-insensitively; a later row replaces
    /// the value of an earlier one but keeps its position.
    pub fn transmitted_headers(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = Vec::new();
        for header in self.headers.iter().filter(|h| h.is_transmittable()) {
            let key = header.key.trim();
            let value = header.value.trim().to_string();
            match out.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                Some(existing) => existing.1 = value,
                None => out.push((key.to_string(), value)),
            }
        }
        out
    }

    /// Body as sent on the wire: only for payload methods and only when non-blank
    pub fn transmitted_body(&self) -> Option<String> {
        if self.method.has_body() && !self.body.trim().is_empty() {
            Some(self.body.clone())
        } else {
            None
        }
    }
}

/// Normalized result of one HTTP call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// 0 means the request never completed
    pub status: u16,
    pub status_text: String,
    /// Keys are lower-cased by the transport
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
}

impl Response {
    /// Synthetic response recorded when the transport failed
    pub fn failed(message: &str) -> Self {
        Response {
            status: 0,
            status_text: crate::constants::FAILED_STATUS_TEXT.to_string(),
            headers: BTreeMap::new(),
            body: format!("Error: {}", message),
            response_time_ms: 0,
        }
    }

    pub fn completed(&self) -> bool {
        self.status != 0
    }
}

/// Compact record of a past dispatch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub method: HttpMethod,
    pub url: String,
    /// RFC 3339 UTC, millisecond precision
    #[serde(rename = "timestamp")]
    pub timestamp_iso: String,
    /// 0 for failed or pending entries
    pub status: u16,
    /// Loaded from a shortcut, never dispatched
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

impl HistoryItem {
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Dispatched, but the exchange never completed
    pub fn is_failed(&self) -> bool {
        !self.pending && self.status == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transmitted_headers_drop_blank_rows() {
        let mut req = Request::default();
        req.set_headers(vec![
            Header::new("a", "1"),
            Header::new("b", ""),
            Header::new("", ""),
            Header::new("  ", "x"),
        ]);
        assert_eq!(req.transmitted_headers(), vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_transmitted_headers_trim_and_merge_case_insensitive() {
        let req = Request::new(HttpMethod::GET, "http://x")
            .with_header(" Accept ", " text/plain ")
            .with_header("X-Id", "1")
            .with_header("accept", "application/json");
        assert_eq!(
            req.transmitted_headers(),
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Id".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_draft_keeps_one_header_row() {
        let mut req = Request::default();
        assert_eq!(req.headers().len(), 1);
        req.remove_header(0);
        assert_eq!(req.headers(), &[Header::blank()]);

        req.set_headers(Vec::new());
        assert_eq!(req.headers().len(), 1);

        let idx = req.add_header();
        assert_eq!(idx, 1);
        req.remove_header(1);
        assert_eq!(req.headers().len(), 1);
    }

    #[test]
    fn test_body_only_for_payload_methods() {
        let mut req = Request::new(HttpMethod::GET, "http://x");
        req.body = "{\"a\":1}".to_string();
        assert_eq!(req.transmitted_body(), None);

        for method in [HttpMethod::POST, HttpMethod::PUT, HttpMethod::PATCH] {
            req.method = method;
            assert_eq!(req.transmitted_body().as_deref(), Some("{\"a\":1}"));
        }

        req.method = HttpMethod::POST;
        req.body = "   \n".to_string();
        assert_eq!(req.transmitted_body(), None);
    }

    #[test]
    fn test_method_cycle_and_parse() {
        let mut m = HttpMethod::GET;
        for _ in 0..HttpMethod::ALL.len() {
            m = m.next();
        }
        assert_eq!(m, HttpMethod::GET);
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::PATCH));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_failed_response_shape() {
        let resp = Response::failed("connection refused");
        assert_eq!(resp.status, 0);
        assert_eq!(resp.status_text, "Request Failed");
        assert!(resp.headers.is_empty());
        assert_eq!(resp.response_time_ms, 0);
        assert!(resp.body.contains("connection refused"));
        assert!(!resp.completed());
    }

    #[test]
    fn test_history_item_wire_names() {
        let item = HistoryItem {
            id: "1700000000000".to_string(),
            method: HttpMethod::DELETE,
            url: "https://example.test/a".to_string(),
            timestamp_iso: "2024-05-01T12:00:00.000Z".to_string(),
            status: 204,
            pending: false,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["method"], "DELETE");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00.000Z");
        assert_eq!(json["status"], 204);
        assert!(json.get("pending").is_none());
    }

    #[test]
    fn test_history_item_without_pending_field_is_not_pending() {
        let raw = r#"{"id":"1","method":"GET","url":"https://example.test","timestamp":"2024-05-01T12:00:00.000Z","status":0}"#;
        let item: HistoryItem = serde_json::from_str(raw).unwrap();
        assert!(!item.is_pending());
        assert!(item.is_failed());
    }
}
