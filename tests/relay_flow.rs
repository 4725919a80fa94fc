//! End-to-end tests for the relay flow, run against fake upstream servers.
//!
//! The fakes stand in for the image host and the generation flow, counting
//! every call so the tests can assert which upstreams were (not) contacted.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use clothai_api_relay::api::routes::{router, AppState};
use clothai_api_relay::{EachlabsClient, ImgbbClient};

const BOUNDARY: &str = "clothai-test-boundary";

struct FakeUpstream {
    upload_calls: AtomicUsize,
    trigger_calls: AtomicUsize,
    poll_calls: AtomicUsize,
    /// 1-based upload call that answers 500; `None` hosts everything.
    fail_upload_at: Option<usize>,
    /// Successive poll bodies; the last one repeats.
    poll_responses: Vec<Value>,
}

impl FakeUpstream {
    fn new(poll_responses: Vec<Value>) -> Arc<Self> {
        Arc::new(FakeUpstream {
            upload_calls: AtomicUsize::new(0),
            trigger_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            fail_upload_at: None,
            poll_responses,
        })
    }

    fn with_failing_upload(fail_at: usize) -> Arc<Self> {
        Arc::new(FakeUpstream {
            upload_calls: AtomicUsize::new(0),
            trigger_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            fail_upload_at: Some(fail_at),
            poll_responses: vec![json!({"status": "running"})],
        })
    }
}

async fn upload_handler(
    State(upstream): State<Arc<FakeUpstream>>,
    Form(fields): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let call = upstream.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if upstream.fail_upload_at == Some(call) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"success": false})));
    }
    let key_ok = fields.get("key").map(String::as_str) == Some("test-key");
    let image_ok = fields.get("image").map(|v| !v.is_empty()).unwrap_or(false);
    if !key_ok || !image_ok {
        return (StatusCode::BAD_REQUEST, Json(json!({"success": false})));
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "data": {"url": format!("https://img.test/{}.jpg", call)}})),
    )
}

async fn trigger_handler(
    State(upstream): State<Arc<FakeUpstream>>,
    Path(_flow_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    upstream.trigger_calls.fetch_add(1, Ordering::SeqCst);
    let person = body.pointer("/parameters/Person").and_then(Value::as_str);
    let cloth = body.pointer("/parameters/Cloth").and_then(Value::as_str);
    if person.is_none() || cloth.is_none() {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"message": "missing parameters"})));
    }
    (StatusCode::OK, Json(json!({"trigger_id": "job123", "status": "queued"})))
}

async fn poll_handler(
    State(upstream): State<Arc<FakeUpstream>>,
    Path((_flow_id, _execution_id)): Path<(String, String)>,
) -> Json<Value> {
    let call = upstream.poll_calls.fetch_add(1, Ordering::SeqCst);
    let idx = call.min(upstream.poll_responses.len() - 1);
    Json(upstream.poll_responses[idx].clone())
}

async fn spawn_upstream(upstream: Arc<FakeUpstream>) -> SocketAddr {
    let app = Router::new()
        .route("/upload", post(upload_handler))
        .route("/:flow_id/trigger", post(trigger_handler))
        .route("/:flow_id/executions/:execution_id", get(poll_handler))
        .with_state(upstream);
    let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);
    addr
}

fn relay_app(upstream_addr: SocketAddr, poll_max_attempts: u32) -> Router {
    let imgbb = ImgbbClient::new(
        format!("http://{}/upload", upstream_addr),
        "test-key".to_string(),
    );
    let eachlabs = EachlabsClient::new(
        format!("http://{}", upstream_addr),
        "flow-1".to_string(),
        "test-key".to_string(),
    );
    let state = Arc::new(AppState {
        imgbb,
        eachlabs,
        poll_interval: Duration::from_millis(5),
        poll_max_attempts,
    });
    router(state)
}

fn multipart_body(parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, bytes) in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn change_cloth_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/change-cloth")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn missing_cloth_field_is_rejected_before_any_upstream_call() {
    let upstream = FakeUpstream::new(vec![json!({"status": "running"})]);
    let addr = spawn_upstream(upstream.clone()).await;
    let app = relay_app(addr, 20);

    let body = multipart_body(&[("person", b"person-bytes".as_slice())]);
    let response = app.oneshot(change_cloth_request(body)).await.unwrap();
    let (status, json_body) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body["error"], "validation");
    assert_eq!(upstream.upload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(upstream.trigger_calls.load(Ordering::SeqCst), 0);
    assert_eq!(upstream.poll_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_person_image_is_rejected_before_any_upstream_call() {
    let upstream = FakeUpstream::new(vec![json!({"status": "running"})]);
    let addr = spawn_upstream(upstream.clone()).await;
    let app = relay_app(addr, 20);

    let body = multipart_body(&[
        ("person", b"".as_slice()),
        ("cloth", b"cloth-bytes".as_slice()),
    ]);
    let response = app.oneshot(change_cloth_request(body)).await.unwrap();
    let (status, json_body) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body["error"], "validation");
    assert_eq!(upstream.upload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(upstream.trigger_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn completed_execution_returns_the_reported_result_url() {
    let upstream = FakeUpstream::new(vec![
        json!({"status": "processing"}),
        json!({"status": "processing"}),
        json!({"status": "succeeded", "result_url": "https://example.com/out.jpg"}),
    ]);
    let addr = spawn_upstream(upstream.clone()).await;
    let app = relay_app(addr, 20);

    let body = multipart_body(&[
        ("person", b"person-bytes".as_slice()),
        ("cloth", b"cloth-bytes".as_slice()),
    ]);
    let response = app.oneshot(change_cloth_request(body)).await.unwrap();
    let (status, json_body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body, json!({"result_url": "https://example.com/out.jpg"}));
    assert_eq!(upstream.upload_calls.load(Ordering::SeqCst), 2);
    assert_eq!(upstream.trigger_calls.load(Ordering::SeqCst), 1);
    // Terminal state short-circuits: two processing polls plus the final one.
    assert_eq!(upstream.poll_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_execution_stops_polling_immediately() {
    let upstream = FakeUpstream::new(vec![
        json!({"status": "processing"}),
        json!({"status": "failed", "error": "flow ran out of credits"}),
    ]);
    let addr = spawn_upstream(upstream.clone()).await;
    let app = relay_app(addr, 20);

    let body = multipart_body(&[
        ("person", b"person-bytes".as_slice()),
        ("cloth", b"cloth-bytes".as_slice()),
    ]);
    let response = app.oneshot(change_cloth_request(body)).await.unwrap();
    let (status, json_body) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json_body["error"], "generation");
    assert!(json_body["message"].as_str().unwrap().contains("flow ran out of credits"));
    assert_eq!(upstream.poll_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn non_terminal_execution_times_out_after_exactly_the_configured_attempts() {
    let upstream = FakeUpstream::new(vec![json!({"status": "processing"})]);
    let addr = spawn_upstream(upstream.clone()).await;
    let app = relay_app(addr, 4);

    let body = multipart_body(&[
        ("person", b"person-bytes".as_slice()),
        ("cloth", b"cloth-bytes".as_slice()),
    ]);
    let response = app.oneshot(change_cloth_request(body)).await.unwrap();
    let (status, json_body) = read_json(response).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json_body["error"], "timeout");
    assert_eq!(upstream.poll_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn cloth_upload_failure_never_reaches_the_generation_flow() {
    let upstream = FakeUpstream::with_failing_upload(2);
    let addr = spawn_upstream(upstream.clone()).await;
    let app = relay_app(addr, 20);

    let body = multipart_body(&[
        ("person", b"person-bytes".as_slice()),
        ("cloth", b"cloth-bytes".as_slice()),
    ]);
    let response = app.oneshot(change_cloth_request(body)).await.unwrap();
    let (status, json_body) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json_body["error"], "upstream");
    assert_eq!(upstream.upload_calls.load(Ordering::SeqCst), 2);
    assert_eq!(upstream.trigger_calls.load(Ordering::SeqCst), 0);
    assert_eq!(upstream.poll_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn status_endpoint_performs_a_single_probe() {
    let upstream = FakeUpstream::new(vec![
        json!({"status": "succeeded", "result_url": "https://example.com/out.jpg"}),
    ]);
    let addr = spawn_upstream(upstream.clone()).await;
    let app = relay_app(addr, 20);

    let request = Request::builder()
        .method("GET")
        .uri("/status/job123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let (status, json_body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body["execution_id"], "job123");
    assert_eq!(json_body["status"], "succeeded");
    assert_eq!(json_body["result_url"], "https://example.com/out.jpg");
    assert_eq!(upstream.poll_calls.load(Ordering::SeqCst), 1);
}
