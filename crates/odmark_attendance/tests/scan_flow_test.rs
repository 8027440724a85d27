//! End-to-end attendance flow over the HTTP surface.

mod fixtures;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use fixtures::{build_test_router, ASTRA_TOKEN, TECHSPARK_TOKEN};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn scan_flow_marks_once_and_reads_back_from_both_sides() {
    let (router, _store) = build_test_router();

    // Club creates an event.
    let (status, event) = send(
        &router,
        Method::POST,
        "/events",
        Some(TECHSPARK_TOKEN),
        Some(json!({
            "title": "Hack Night",
            "date": "2026-08-21",
            "venue": "Main Hall"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_str().unwrap().to_string();

    // First scan marks with the synthesized fallback identity.
    let (status, body) = send(
        &router,
        Method::POST,
        "/attendance/scan",
        Some(TECHSPARK_TOKEN),
        Some(json!({ "event_id": event_id, "reg_no": "cs101" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "marked");
    assert_eq!(body["record"]["regNo"], "CS101");
    assert_eq!(body["record"]["studentEmail"], "cs101@ritchennai.edu.in");
    assert_eq!(body["record"]["status"], "Confirmed");

    // Re-scan of the same student (case and whitespace noise included)
    // is a duplicate, not a second record.
    let (status, body) = send(
        &router,
        Method::POST,
        "/attendance/scan",
        Some(TECHSPARK_TOKEN),
        Some(json!({ "event_id": event_id, "reg_no": "CS101 " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "already_marked");

    // The club roster and the student history both see the single record.
    let (status, roster) = send(
        &router,
        Method::GET,
        &format!("/events/{}/attendance", event_id),
        Some(TECHSPARK_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster.as_array().unwrap().len(), 1);
    assert_eq!(roster[0]["regNo"], "CS101");

    let (status, history) = send(
        &router,
        Method::GET,
        "/students/cs101/attendance",
        Some(TECHSPARK_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["eventTitle"], "Hack Night");
    assert_eq!(roster[0], history[0]);
}

#[tokio::test]
async fn requests_without_a_token_are_rejected() {
    let (router, _store) = build_test_router();

    let (status, _) = send(&router, Method::GET, "/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &router,
        Method::GET,
        "/events",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn another_club_cannot_scan_into_a_foreign_event() {
    let (router, _store) = build_test_router();

    let (_, event) = send(
        &router,
        Method::POST,
        "/events",
        Some(TECHSPARK_TOKEN),
        Some(json!({
            "title": "Hack Night",
            "date": "2026-08-21",
            "venue": "Main Hall"
        })),
    )
    .await;
    let event_id = event["id"].as_str().unwrap();

    let (status, _) = send(
        &router,
        Method::POST,
        "/attendance/scan",
        Some(ASTRA_TOKEN),
        Some(json!({ "event_id": event_id, "reg_no": "CS101" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/events/{}", event_id),
        Some(ASTRA_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn scanning_into_an_unknown_event_is_not_found() {
    let (router, _store) = build_test_router();

    let (status, _) = send(
        &router,
        Method::POST,
        "/attendance/scan",
        Some(TECHSPARK_TOKEN),
        Some(json!({ "event_id": "missing", "reg_no": "CS101" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_event_removes_it_from_the_listing() {
    let (router, _store) = build_test_router();

    let (_, event) = send(
        &router,
        Method::POST,
        "/events",
        Some(TECHSPARK_TOKEN),
        Some(json!({
            "title": "Hack Night",
            "date": "2026-08-21",
            "venue": "Main Hall"
        })),
    )
    .await;
    let event_id = event["id"].as_str().unwrap();

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/events/{}", event_id),
        Some(TECHSPARK_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, events) = send(&router, Method::GET, "/events", Some(TECHSPARK_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(events.as_array().unwrap().is_empty());
}
