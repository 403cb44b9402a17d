//! Dispatch controller - validate draft, run the transport, record the result
//!
//! ```text
//! Idle --send--> Sending --Ok(Response)------> Succeeded --> Idle
//!                        --Err(TransportError)--> Failed ----> Idle
//! ```
//!
//! Only one dispatch may be outstanding: a second `begin` while one is in
//! flight is rejected with `DispatchError::Busy`. There is no cancellation;
//! an in-flight request resolves or times out on its own.

use std::fmt;
use std::sync::Arc;

use crate::error::{DispatchError, TransportError};
use crate::models::{HistoryItem, HttpMethod, Request, Response};
use crate::network::transport::{OutgoingRequest, Transport};
use crate::storage::{HistoryStore, KeyValueStore};

pub const EMPTY_URL_MESSAGE: &str = "Please enter a URL";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Sending,
}

/// Terminal result of one dispatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The exchange completed; any status code lands here
    Succeeded(Response),
    /// The transport failed; `response` is the synthetic status-0 response
    Failed {
        response: Response,
        error: TransportError,
    },
}

impl DispatchOutcome {
    pub fn response(&self) -> &Response {
        match self {
            DispatchOutcome::Succeeded(response) => response,
            DispatchOutcome::Failed { response, .. } => response,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Succeeded(_))
    }
}

/// A validated dispatch, ready to run off the controller
pub struct PendingDispatch {
    pub id: u64,
    pub request: OutgoingRequest,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for PendingDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingDispatch")
            .field("id", &self.id)
            .field("request", &self.request)
            .field("transport", &self.transport.name())
            .finish()
    }
}

impl PendingDispatch {
    /// Perform the single network attempt
    pub async fn execute(self) -> (u64, Result<Response, TransportError>) {
        tracing::info!(
            id = self.id,
            method = %self.request.method,
            url = %self.request.url,
            transport = self.transport.name(),
            "Executing request"
        );
        let result = self.transport.send(&self.request).await;
        match &result {
            Ok(resp) => tracing::info!(
                id = self.id,
                status = resp.status,
                elapsed_ms = resp.response_time_ms,
                "Request completed"
            ),
            Err(e) => tracing::info!(id = self.id, category = e.category(), error = %e, "Request failed"),
        }
        (self.id, result)
    }
}

#[derive(Clone, Debug)]
struct InFlight {
    id: u64,
    method: HttpMethod,
    url: String,
}

/// Owns the displayed response, error banner and history
pub struct DispatchController {
    transport: Arc<dyn Transport>,
    store: Arc<dyn KeyValueStore>,
    history: HistoryStore,
    response: Option<Response>,
    error: Option<String>,
    in_flight: Option<InFlight>,
    next_id: u64,
}

impl DispatchController {
    /// Create a controller, rehydrating history from `store`
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
        history_limit: usize,
    ) -> Self {
        let history = HistoryStore::load(store.as_ref(), history_limit);
        DispatchController {
            transport,
            store,
            history,
            response: None,
            error: None,
            in_flight: None,
            next_id: 1,
        }
    }

    pub fn phase(&self) -> DispatchPhase {
        if self.in_flight.is_some() {
            DispatchPhase::Sending
        } else {
            DispatchPhase::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == DispatchPhase::Sending
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Idle -> Sending. Nothing changes when rejected as busy.
    pub fn begin(&mut self, draft: &Request) -> Result<PendingDispatch, DispatchError> {
        if self.in_flight.is_some() {
            return Err(DispatchError::Busy);
        }
        if !draft.has_url() {
            self.error = Some(EMPTY_URL_MESSAGE.to_string());
            return Err(DispatchError::Validation(EMPTY_URL_MESSAGE.to_string()));
        }

        self.response = None;
        self.error = None;

        let id = self.next_id;
        self.next_id += 1;
        self.in_flight = Some(InFlight {
            id,
            method: draft.method,
            url: draft.url.clone(),
        });

        Ok(PendingDispatch {
            id,
            request: OutgoingRequest::from_draft(draft),
            transport: Arc::clone(&self.transport),
        })
    }

    /// Sending -> Succeeded/Failed -> Idle. Results for unknown ids are ignored.
    pub fn finish(
        &mut self,
        id: u64,
        result: Result<Response, TransportError>,
    ) -> Option<DispatchOutcome> {
        let flight = match self.in_flight.take() {
            Some(flight) if flight.id == id => flight,
            other => {
                tracing::debug!(id, "Ignoring result for a dispatch that is not in flight");
                self.in_flight = other;
                return None;
            }
        };

        let outcome = match result {
            Ok(response) => {
                self.history.record(flight.method, &flight.url, response.status);
                self.response = Some(response.clone());
                DispatchOutcome::Succeeded(response)
            }
            Err(error) => {
                let message = error.to_string();
                let response = Response::failed(&message);
                self.history.record(flight.method, &flight.url, 0);
                self.response = Some(response.clone());
                self.error = Some(message);
                DispatchOutcome::Failed { response, error }
            }
        };
        self.persist_history();
        Some(outcome)
    }

    /// Full cycle in one call: begin, await the transport, finish
    pub async fn dispatch(&mut self, draft: &Request) -> Result<DispatchOutcome, DispatchError> {
        let pending = self.begin(draft)?;
        let (id, result) = pending.execute().await;
        self.finish(id, result).ok_or(DispatchError::Busy)
    }

    /// Drop the displayed response and error banner
    pub fn clear_display(&mut self) {
        self.response = None;
        self.error = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    /// Synthetic "Pending" entry (status 0) for shortcut-loaded requests
    pub fn record_pending(&mut self, method: HttpMethod, url: &str) -> HistoryItem {
        let item = self.history.record_pending(method, url);
        self.persist_history();
        item
    }

    fn persist_history(&self) {
        if let Err(e) = self.history.save(self.store.as_ref()) {
            tracing::warn!(error = %e, "Failed to persist history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HISTORY_KEY;
    use crate::models::Header;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays canned results and records what it was asked to send
    struct FakeTransport {
        result: Result<Response, TransportError>,
        calls: AtomicUsize,
        seen: Mutex<Vec<OutgoingRequest>>,
    }

    impl FakeTransport {
        fn new(result: Result<Response, TransportError>) -> Arc<Self> {
            Arc::new(FakeTransport {
                result,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn status(status: u16) -> Arc<Self> {
            Self::new(Ok(Response {
                status,
                status_text: "Whatever".to_string(),
                body: "{}".to_string(),
                response_time_ms: 12,
                ..Response::default()
            }))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn send(&self, request: &OutgoingRequest) -> Result<Response, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            self.result.clone()
        }
    }

    fn controller(transport: Arc<FakeTransport>) -> (DispatchController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let controller = DispatchController::new(transport, store.clone(), 50);
        (controller, store)
    }

    #[tokio::test]
    async fn test_blank_url_never_reaches_transport() {
        let transport = FakeTransport::status(200);
        let (mut ctl, _) = controller(transport.clone());

        for url in ["", "   ", "\t\n"] {
            let draft = Request::new(HttpMethod::GET, url);
            let err = ctl.dispatch(&draft).await.unwrap_err();
            assert!(matches!(err, DispatchError::Validation(_)));
            assert_eq!(ctl.phase(), DispatchPhase::Idle);
        }
        assert_eq!(transport.calls(), 0);
        assert!(ctl.history().is_empty());
        assert_eq!(ctl.error(), Some(EMPTY_URL_MESSAGE));
    }

    #[tokio::test]
    async fn test_transport_failure_records_status_zero() {
        let transport = FakeTransport::new(Err(TransportError::Unreachable("refused".to_string())));
        let (mut ctl, _) = controller(transport);

        let draft = Request::new(HttpMethod::GET, "https://example.test/");
        let outcome = ctl.dispatch(&draft).await.unwrap();

        let response = outcome.response();
        assert!(!outcome.is_success());
        assert_eq!(response.status, 0);
        assert_eq!(response.status_text, "Request Failed");
        assert!(response.headers.is_empty());
        assert_eq!(response.response_time_ms, 0);
        assert!(response.body.contains("refused"));

        let item = ctl.history().get(0).unwrap();
        assert_eq!(item.status, 0);
        assert_eq!(item.url, "https://example.test/");
        assert!(item.is_failed());
        assert_eq!(ctl.phase(), DispatchPhase::Idle);
        assert!(ctl.error().unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn test_404_is_a_success() {
        let (mut ctl, _) = controller(FakeTransport::status(404));
        let draft = Request::new(HttpMethod::DELETE, "https://example.test/missing");

        let outcome = ctl.dispatch(&draft).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(ctl.response().unwrap().status, 404);
        assert_eq!(ctl.history().get(0).unwrap().status, 404);
        assert_eq!(ctl.history().get(0).unwrap().method, HttpMethod::DELETE);
        assert_eq!(ctl.error(), None);
    }

    #[tokio::test]
    async fn test_blank_header_rows_are_not_sent() {
        let transport = FakeTransport::status(200);
        let (mut ctl, _) = controller(transport.clone());

        let mut draft = Request::new(HttpMethod::POST, "https://example.test/");
        draft.set_headers(vec![Header::new("a", "1"), Header::new("b", ""), Header::blank()]);
        draft.body = "payload".to_string();
        ctl.dispatch(&draft).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].headers, vec![("a".to_string(), "1".to_string())]);
        assert_eq!(seen[0].body.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn test_overlapping_send_is_rejected() {
        let transport = FakeTransport::status(200);
        let (mut ctl, _) = controller(transport.clone());
        let draft = Request::new(HttpMethod::GET, "https://example.test/");

        let first = ctl.begin(&draft).unwrap();
        assert_eq!(ctl.phase(), DispatchPhase::Sending);
        assert_eq!(ctl.begin(&draft).unwrap_err(), DispatchError::Busy);

        let (id, result) = first.execute().await;
        assert!(ctl.finish(id, result).is_some());
        assert_eq!(ctl.phase(), DispatchPhase::Idle);
        assert_eq!(transport.calls(), 1);
        assert_eq!(ctl.history().len(), 1);
    }

    #[tokio::test]
    async fn test_begin_clears_previous_response_and_error() {
        let (mut ctl, _) = controller(FakeTransport::status(200));
        ctl.dispatch(&Request::new(HttpMethod::GET, "https://example.test/"))
            .await
            .unwrap();
        let _ = ctl.begin(&Request::default());
        assert!(ctl.error().is_some());
        assert!(ctl.response().is_some());

        let pending = ctl.begin(&Request::new(HttpMethod::GET, "https://example.test/")).unwrap();
        assert!(ctl.response().is_none());
        assert!(ctl.error().is_none());
        drop(pending);
    }

    #[tokio::test]
    async fn test_stale_result_is_ignored() {
        let (mut ctl, _) = controller(FakeTransport::status(200));
        let pending = ctl.begin(&Request::new(HttpMethod::GET, "https://example.test/")).unwrap();

        assert!(ctl.finish(pending.id + 7, Ok(Response::default())).is_none());
        assert_eq!(ctl.phase(), DispatchPhase::Sending);
        assert!(ctl.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_persisted_and_cleared() {
        let (mut ctl, store) = controller(FakeTransport::status(201));
        ctl.dispatch(&Request::new(HttpMethod::POST, "https://example.test/items"))
            .await
            .unwrap();

        let raw = store.get(HISTORY_KEY).unwrap().unwrap();
        assert!(raw.contains("https://example.test/items"));

        let reloaded = HistoryStore::load(store.as_ref(), 50);
        assert_eq!(reloaded.to_vec(), ctl.history().to_vec());

        ctl.clear_history();
        assert!(HistoryStore::load(store.as_ref(), 50).is_empty());
    }

    #[tokio::test]
    async fn test_history_limit_applies_to_dispatches() {
        let store = Arc::new(MemoryStore::new());
        let mut ctl = DispatchController::new(FakeTransport::status(200), store, 3);
        for n in 0..5 {
            let draft = Request::new(HttpMethod::GET, format!("https://example.test/{}", n));
            ctl.dispatch(&draft).await.unwrap();
        }
        let urls: Vec<_> = ctl.history().items().map(|i| i.url.clone()).collect();
        assert_eq!(
            urls,
            vec!["https://example.test/4", "https://example.test/3", "https://example.test/2"]
        );
    }

    #[test]
    fn test_record_pending() {
        let (mut ctl, _) = controller(FakeTransport::status(200));
        let item = ctl.record_pending(HttpMethod::GET, "https://example.test/");
        assert!(item.is_pending());
        assert_eq!(ctl.history().len(), 1);
    }
}
