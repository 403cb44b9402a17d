//! Transports against a local axum server

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;

use hermes::network::{OutgoingRequest, PrivilegedTransport, SandboxedTransport, Transport};
use hermes::{DispatchController, HttpMethod, MemoryStore, Request, TransportError};

const PAGE_ORIGIN: &str = "http://localhost:5173";

#[derive(Clone, Default)]
struct Counters {
    preflights: Arc<AtomicUsize>,
    puts: Arc<AtomicUsize>,
}

async fn json() -> impl IntoResponse {
    ([("content-type", "application/json")], r#"{"id":1,"tags":["a"]}"#)
}

async fn missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing here")
}

async fn bad_json() -> impl IntoResponse {
    (
        [
            ("content-type", "application/json"),
            ("access-control-allow-origin", "*"),
        ],
        "{not json",
    )
}

async fn cors_allowed() -> impl IntoResponse {
    (
        [
            ("content-type", "application/json"),
            ("access-control-allow-origin", PAGE_ORIGIN),
            ("access-control-expose-headers", "X-Request-Id"),
            ("x-request-id", "abc"),
            ("x-internal", "secret"),
        ],
        r#"{"ok":true}"#,
    )
}

async fn cors_missing() -> impl IntoResponse {
    ([("x-internal", "secret")], "hidden")
}

async fn items_preflight(State(counters): State<Counters>) -> impl IntoResponse {
    counters.preflights.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::NO_CONTENT,
        [
            ("access-control-allow-origin", PAGE_ORIGIN),
            ("access-control-allow-methods", "GET, PUT"),
            ("access-control-allow-headers", "x-api-key"),
        ],
    )
}

async fn items_put(State(counters): State<Counters>) -> impl IntoResponse {
    counters.puts.fetch_add(1, Ordering::SeqCst);
    ([("access-control-allow-origin", PAGE_ORIGIN)], "updated")
}

async fn strict_preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [("access-control-allow-origin", PAGE_ORIGIN)])
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "too late"
}

async fn echo(headers: HeaderMap, body: String) -> impl IntoResponse {
    let names: Vec<String> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-"))
        .map(|(name, value)| format!("{}={}", name, value.to_str().unwrap_or("")))
        .collect();
    format!("{}|{}", names.join(";"), body)
}

async fn spawn_server() -> (String, Counters) {
    let counters = Counters::default();
    let app = Router::new()
        .route("/json", get(json))
        .route("/missing", get(missing))
        .route("/bad-json", get(bad_json))
        .route("/cors", get(cors_allowed))
        .route("/no-cors", get(cors_missing))
        .route("/items", put(items_put).options(items_preflight))
        .route("/strict", put(items_put).options(strict_preflight))
        .route("/echo", post(echo))
        .route("/slow", get(slow))
        .with_state(counters.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), counters)
}

fn request(method: HttpMethod, url: String) -> OutgoingRequest {
    OutgoingRequest {
        method,
        url,
        headers: Vec::new(),
        body: None,
    }
}

fn privileged() -> PrivilegedTransport {
    PrivilegedTransport::new(Duration::from_secs(5))
}

#[tokio::test]
async fn test_privileged_error_status_is_a_response() {
    let (base, _) = spawn_server().await;
    let resp = privileged()
        .send(&request(HttpMethod::GET, format!("{}/missing", base)))
        .await
        .unwrap();
    assert_eq!(resp.status, 404);
    assert_eq!(resp.status_text, "Not Found");
    assert_eq!(resp.body, "nothing here");
}

#[tokio::test]
async fn test_privileged_pretty_prints_json() {
    let (base, _) = spawn_server().await;
    let resp = privileged()
        .send(&request(HttpMethod::GET, format!("{}/json", base)))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "{\n  \"id\": 1,\n  \"tags\": [\n    \"a\"\n  ]\n}");
    assert_eq!(resp.headers.get("content-type").map(String::as_str), Some("application/json"));
}

#[tokio::test]
async fn test_privileged_ignores_cors() {
    let (base, _) = spawn_server().await;
    let resp = privileged()
        .send(&request(HttpMethod::GET, format!("{}/no-cors", base)))
        .await
        .unwrap();
    assert_eq!(resp.body, "hidden");
    assert!(resp.headers.contains_key("x-internal"));
}

/// Base URL of a port nothing listens on
async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_privileged_closed_port_is_a_transport_error() {
    let base = closed_port().await;
    let err = privileged()
        .send(&request(HttpMethod::GET, format!("{}/", base)))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Unreachable(_)), "{:?}", err);
}

#[tokio::test]
async fn test_privileged_slow_server_times_out() {
    let (base, _) = spawn_server().await;
    let timeout = Duration::from_millis(200);
    let err = PrivilegedTransport::new(timeout)
        .send(&request(HttpMethod::GET, format!("{}/slow", base)))
        .await
        .unwrap_err();
    assert_eq!(err, TransportError::Timeout(timeout));
    assert_eq!(err.category(), "timeout");
}

#[tokio::test]
async fn test_privileged_unresolvable_host_is_dns_failure() {
    let err = privileged()
        .send(&request(HttpMethod::GET, "http://hermes-nowhere.invalid/".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Dns(_)), "{:?}", err);
    assert_eq!(err.category(), "dns failure");
}

#[tokio::test]
async fn test_sandboxed_same_origin_sees_everything() {
    let (base, counters) = spawn_server().await;
    let transport = SandboxedTransport::new(&base).unwrap();

    let resp = transport
        .send(&request(HttpMethod::GET, format!("{}/no-cors", base)))
        .await
        .unwrap();
    assert_eq!(resp.body, "hidden");
    assert!(resp.headers.contains_key("x-internal"));

    // same-origin PUT needs no preflight
    transport
        .send(&request(HttpMethod::PUT, format!("{}/items", base)))
        .await
        .unwrap();
    assert_eq!(counters.preflights.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sandboxed_cross_origin_allowed() {
    let (base, _) = spawn_server().await;
    let transport = SandboxedTransport::new(PAGE_ORIGIN).unwrap();

    let resp = transport
        .send(&request(HttpMethod::GET, format!("{}/cors", base)))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "{\n  \"ok\": true\n}");
    assert!(resp.headers.contains_key("content-type"));
    assert!(resp.headers.contains_key("x-request-id"));
    assert!(!resp.headers.contains_key("x-internal"));
}

#[tokio::test]
async fn test_sandboxed_cross_origin_blocked() {
    let (base, _) = spawn_server().await;
    let transport = SandboxedTransport::new(PAGE_ORIGIN).unwrap();

    let err = transport
        .send(&request(HttpMethod::GET, format!("{}/no-cors", base)))
        .await
        .unwrap_err();
    assert!(err.is_cross_origin());
    assert_eq!(err.category(), "cross-origin restriction");
}

#[tokio::test]
async fn test_sandboxed_preflight_then_put() {
    let (base, counters) = spawn_server().await;
    let transport = SandboxedTransport::new(PAGE_ORIGIN).unwrap();

    let mut req = request(HttpMethod::PUT, format!("{}/items", base));
    req.headers.push(("X-Api-Key".to_string(), "k".to_string()));
    let resp = transport.send(&req).await.unwrap();

    assert_eq!(resp.body, "updated");
    assert_eq!(counters.preflights.load(Ordering::SeqCst), 1);
    assert_eq!(counters.puts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sandboxed_rejected_preflight_skips_request() {
    let (base, counters) = spawn_server().await;
    let transport = SandboxedTransport::new(PAGE_ORIGIN).unwrap();

    let err = transport
        .send(&request(HttpMethod::PUT, format!("{}/strict", base)))
        .await
        .unwrap_err();
    assert!(err.is_cross_origin());
    assert_eq!(counters.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sandboxed_unreachable_preflight_is_not_cross_origin() {
    let base = closed_port().await;
    let transport = SandboxedTransport::new(PAGE_ORIGIN).unwrap();

    let put = transport
        .send(&request(HttpMethod::PUT, format!("{}/items", base)))
        .await
        .unwrap_err();
    let get = transport
        .send(&request(HttpMethod::GET, format!("{}/items", base)))
        .await
        .unwrap_err();

    assert!(matches!(put, TransportError::Unreachable(_)), "{:?}", put);
    assert_eq!(put.category(), get.category());
    assert_eq!(put.category(), "network unreachable");
}

#[tokio::test]
async fn test_sandboxed_bad_json_falls_back_to_raw() {
    let (base, _) = spawn_server().await;
    let transport = SandboxedTransport::new(PAGE_ORIGIN).unwrap();

    let resp = transport
        .send(&request(HttpMethod::GET, format!("{}/bad-json", base)))
        .await
        .unwrap();
    assert_eq!(resp.body, "{not json");
}

#[tokio::test]
async fn test_controller_sends_only_filled_headers() {
    let (base, _) = spawn_server().await;
    let store = Arc::new(MemoryStore::new());
    let mut controller = DispatchController::new(Arc::new(privileged()), store, 10);

    let mut draft = Request::new(HttpMethod::POST, format!("{}/echo", base))
        .with_header("X-One", "1")
        .with_header("X-Blank", "  ")
        .with_header("  ", "orphan");
    draft.body = "payload".to_string();

    let outcome = controller.dispatch(&draft).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.response().body, "x-one=1|payload");
    assert_eq!(controller.history().len(), 1);
    assert_eq!(controller.history().get(0).map(|item| item.status), Some(200));
}
