//! End-to-end tests for the canonical-log HTTP layer, driven through an
//! axum router with `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tower::ServiceExt;
use widelog::{CanonicalLogLayer, LogContext};

/// Collects sink payloads for assertions.
fn capture() -> (Arc<Mutex<Vec<String>>>, CanonicalLogLayer) {
    let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = Arc::clone(&lines);
    let layer = CanonicalLogLayer::new(move |line| sink_lines.lock().unwrap().push(line));
    (lines, layer)
}

/// Parses the single captured payload, checking the duration field is a
/// plausible number before zeroing it for a deterministic comparison.
fn single_event(lines: &Arc<Mutex<Vec<String>>>) -> serde_json::Value {
    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 1, "sink must be invoked exactly once");
    let mut event: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    let duration = event["http"]["response"]["duration_ms"]
        .as_i64()
        .expect("duration_ms is an integer");
    assert!((0..1000).contains(&duration), "duration {duration}ms");
    event["http"]["response"]["duration_ms"] = 0.into();
    event
}

#[tokio::test]
async fn test_request_response_fields_reach_the_sink() {
    let (lines, layer) = capture();
    let app = Router::new()
        .route(
            "/test",
            get(|| async { ([(header::CONTENT_LENGTH, "2")], "OK").into_response() }),
        )
        .layer(layer);

    let response = app
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        single_event(&lines),
        serde_json::json!({
            "http": {
                "request": {"method": "GET", "path": "/test", "body_bytes": 0},
                "response": {"duration_ms": 0, "body_bytes": 2, "status_code": 200},
            }
        })
    );
}

#[tokio::test]
async fn test_invalid_content_length_counts_as_zero() {
    let (lines, layer) = capture();
    let app = Router::new()
        .route(
            "/test",
            get(|| async { ([(header::CONTENT_LENGTH, "invalid")], "OK").into_response() }),
        )
        .layer(layer);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/test")
                .header(header::CONTENT_LENGTH, "not-a-number")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        single_event(&lines),
        serde_json::json!({
            "http": {
                "request": {"method": "GET", "path": "/test", "body_bytes": 0},
                "response": {"duration_ms": 0, "body_bytes": 0, "status_code": 200},
            }
        })
    );
}

#[tokio::test]
async fn test_request_content_length_is_recorded() {
    let (lines, layer) = capture();
    let app = Router::new()
        .route("/submit", axum::routing::post(|| async { StatusCode::NO_CONTENT }))
        .layer(layer);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/submit")
                .header(header::CONTENT_LENGTH, "11")
                .body(Body::from("hello world"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let event = single_event(&lines);
    assert_eq!(event["http"]["request"]["method"], "POST");
    assert_eq!(event["http"]["request"]["body_bytes"], 11);
    assert_eq!(event["http"]["response"]["status_code"], 204);
}

#[tokio::test]
async fn test_handler_annotations_share_the_request_context() {
    let (lines, layer) = capture();
    let app = Router::new()
        .route(
            "/user",
            get(|ctx: LogContext| async move {
                ctx.set_string("user.id", "u-123");
                ctx.add_int("db.queries", 2);
                "OK"
            }),
        )
        .layer(layer);

    let response = app
        .oneshot(Request::builder().uri("/user").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let event = single_event(&lines);
    assert_eq!(event["user"]["id"], "u-123");
    assert_eq!(event["db"]["queries"], 2);
    assert_eq!(event["http"]["request"]["path"], "/user");
}

#[tokio::test]
async fn test_extractor_without_layer_is_inert() {
    // Handlers written against LogContext must keep working when the
    // layer is not installed.
    let app = Router::new().route(
        "/bare",
        get(|ctx: LogContext| async move {
            ctx.set_string("ignored", "yes");
            assert!(!ctx.is_initialized());
            "OK"
        }),
    );

    let response = app
        .oneshot(Request::builder().uri("/bare").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sink_sees_error_statuses() {
    let (lines, layer) = capture();
    let app = Router::new()
        .route(
            "/boom",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .layer(layer);

    let response = app
        .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let event = single_event(&lines);
    assert_eq!(event["http"]["response"]["status_code"], 500);
}
