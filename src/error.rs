//! Error types for dispatch, transport and persistence

use std::time::Duration;
use thiserror::Error;

/// Reasons a dispatch never reached the transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{0}")]
    Validation(String),

    #[error("A request is already in flight")]
    Busy,
}

/// Network-level failure: the HTTP exchange did not complete.
///
/// Any received status code, 4xx/5xx included, is not a `TransportError`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out ({}s)", .0.as_secs())]
    Timeout(Duration),

    #[error("DNS lookup failed: {0}")]
    Dns(String),

    #[error("Connection failed: {0}")]
    Unreachable(String),

    #[error("Cross-origin request from {origin} to {target} was blocked")]
    CrossOrigin { origin: String, target: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request failed: {0}")]
    Network(String),
}

impl TransportError {
    /// User-visible category label
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::Dns(_) => "dns failure",
            TransportError::Unreachable(_) => "network unreachable",
            TransportError::CrossOrigin { .. } => "cross-origin restriction",
            TransportError::InvalidRequest(_) => "invalid request",
            TransportError::Network(_) => "network error",
        }
    }

    pub fn is_cross_origin(&self) -> bool {
        matches!(self, TransportError::CrossOrigin { .. })
    }

    /// Classify a reqwest failure
    pub fn from_reqwest(e: &reqwest::Error, timeout: Option<Duration>) -> Self {
        if e.is_timeout() {
            return TransportError::Timeout(timeout.unwrap_or_default());
        }
        if e.is_builder() {
            return TransportError::InvalidRequest(e.to_string());
        }
        let detail = error_chain(e);
        if e.is_connect() {
            if detail.to_ascii_lowercase().contains("dns") {
                TransportError::Dns(detail)
            } else {
                TransportError::Unreachable(detail)
            }
        } else {
            TransportError::Network(detail)
        }
    }
}

/// reqwest's Display hides the root cause; walk the source chain
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![e.to_string()];
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        source = inner.source();
    }
    parts.join(": ")
}

/// Durable key-value store failures
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
