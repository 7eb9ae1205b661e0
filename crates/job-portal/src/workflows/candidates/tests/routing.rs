use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::candidates::router::submit_handler;
use crate::workflows::candidates::PortalService;
use crate::workflows::priority::test_support::scored_dataset;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn submit_route_creates_pending_candidates() {
    let harness = build_service(Vec::new());

    let response = router_for(&harness)
        .oneshot(json_request(
            "POST",
            "/api/v1/candidates",
            serde_json::to_value(submission("grace")).unwrap(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["username"], json!("grace"));
    assert_eq!(payload["status"], json!("Pending"));
    assert_eq!(payload["priority_score"], json!(120.0));
    assert!(payload.get("feedback").is_none());
}

#[tokio::test]
async fn submit_handler_maps_validation_and_duplicates() {
    let harness = build_service(Vec::new());

    let mut invalid = submission("old");
    invalid.age = 71;
    let response = submit_handler(State(harness.service.clone()), axum::Json(invalid)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response =
        submit_handler(State(harness.service.clone()), axum::Json(submission("grace"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response =
        submit_handler(State(harness.service.clone()), axum::Json(submission("grace"))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().unwrap_or_default().contains("grace"));
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_storage_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let service = PortalService::new(Arc::new(UnavailableRepository), registry(&dir))
        .expect("service initializes");

    let response = submit_handler(State(Arc::new(service)), axum::Json(submission("grace"))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn list_route_filters_and_ranks() {
    let harness = build_service(scored_dataset(10));

    let response = router_for(&harness)
        .oneshot(empty_request(
            "GET",
            "/api/v1/candidates?status=Pending&job_role=All&search=canada",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("array payload");
    assert_eq!(rows.len(), 10);
    let scores: Vec<f64> = rows
        .iter()
        .map(|row| row["PriorityScore"].as_f64().unwrap_or_default())
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));

    let response = router_for(&harness)
        .oneshot(empty_request("GET", "/api/v1/candidates?status=Approved"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!([]));
}

#[tokio::test]
async fn list_route_rejects_unknown_status() {
    let harness = build_service(Vec::new());

    let response = router_for(&harness)
        .oneshot(empty_request("GET", "/api/v1/candidates?status=Shortlisted"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_usernames() {
    let harness = build_service(Vec::new());

    let response = router_for(&harness)
        .oneshot(empty_request("GET", "/api/v1/candidates/ghost"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload.get("error").is_some());
}

#[tokio::test]
async fn decision_route_rejects_with_feedback() {
    let harness = build_service(Vec::new());
    harness
        .service
        .submit(junior_submission("jun"))
        .expect("submits");

    let response = router_for(&harness)
        .oneshot(json_request(
            "POST",
            "/api/v1/candidates/jun/decision",
            json!({ "outcome": "rejected" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("Rejected"));
    assert!(payload["feedback"]
        .as_str()
        .unwrap_or_default()
        .starts_with("AI Feedback:"));
}

#[tokio::test]
async fn review_next_pops_until_empty() {
    let harness = build_service(Vec::new());
    harness.service.submit(submission("grace")).expect("submits");

    let response = router_for(&harness)
        .oneshot(empty_request("POST", "/api/v1/review/next"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["candidate"]["Username"], json!("grace"));
    assert_eq!(payload["remaining"], json!(0));

    let response = router_for(&harness)
        .oneshot(empty_request("POST", "/api/v1/review/next"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn retrain_route_reports_conflict_without_history() {
    let harness = build_service(Vec::new());

    let response = router_for(&harness)
        .oneshot(empty_request("POST", "/api/v1/model/retrain"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn retrain_route_returns_the_training_report() {
    let harness = build_service(scored_dataset(10));

    let response = router_for(&harness)
        .oneshot(empty_request("POST", "/api/v1/model/retrain"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["n_trees"], json!(8));
    assert_eq!(payload["train_rows"], json!(8));
}
