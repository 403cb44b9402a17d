//! # Hermes
//!
//! A terminal HTTP request composer in the spirit of Postman.
//!
//! ## Features
//! - All seven common HTTP methods with a header and body editor
//! - Two transports: a privileged one that ignores browser rules and a
//!   sandboxed one that enforces cross-origin checks like a web page would
//! - Persistent, size-capped request history
//! - JSON pretty-printing and syntax highlighting
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (draft + dispatch state machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, AppState, DispatchController, DispatchOutcome};
pub use config::{Config, TransportMode};
pub use error::{DispatchError, StorageError, TransportError};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{Header, HistoryItem, HttpMethod, Request, Response};
pub use network::{NetworkActor, OutgoingRequest, Transport};
pub use storage::{FileStore, HistoryStore, KeyValueStore, MemoryStore};
