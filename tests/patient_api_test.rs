//! Patient REST API Tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt; // for `oneshot`
use patientdb::api;
use patientdb::config::Config;
use patientdb::repository::InMemoryPatientRepository;
use patientdb::service::PatientService;
use serde_json::{json, Value};
use std::sync::Arc;

fn app() -> Router {
    let service = PatientService::new(Arc::new(InMemoryPatientRepository::new()));
    api::router(service, &Config::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body_json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };
    (status, headers, body_json)
}

#[tokio::test]
async fn test_patient_crud_scenario() {
    let app = app();

    // 1. Create
    let (status, headers, body) = send(&app, "POST", "/patient", Some(json!({"firstName": "Jane", "lastName": "Doe"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(headers[header::LOCATION], "/patient/1");
    assert!(headers.contains_key("X-Request-ID"));

    // 2. Read
    let (status, _, body) = send(&app, "GET", "/patient/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Jane");
    assert_eq!(body["lastName"], "Doe");
    assert!(body["email"].is_null());

    // 3. Full replace
    let (status, _, body) = send(&app, "PUT", "/patient/1", Some(json!({"firstName": "Jane", "lastName": "Smith"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["lastName"], "Smith");

    // 4. Delete
    let (status, _, body) = send(&app, "DELETE", "/patient/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    // 5. Gone
    let (status, _, body) = send(&app, "GET", "/patient/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["details"], "Patient not found with id: 1");
}

#[tokio::test]
async fn test_create_ignores_client_id() {
    let app = app();

    let (status, headers, body) = send(&app, "POST", "/patient", Some(json!({"id": 42, "firstName": "Jane", "lastName": "Doe"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(headers[header::LOCATION], "/patient/1");

    let (status, _, _) = send(&app, "GET", "/patient/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_clears_omitted_fields() {
    let app = app();
    send(&app, "POST", "/patient", Some(json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "email": "jane@example.com",
        "phoneNumber": "+1 (555) 010-0100"
    }))).await;

    let (status, _, body) = send(&app, "PUT", "/patient/1", Some(json!({"firstName": "Jane", "lastName": "Doe"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["email"].is_null());
    assert!(body["phoneNumber"].is_null());
}

#[tokio::test]
async fn test_validation_rejects_before_persisting() {
    let app = app();

    let (status, _, body) = send(&app, "POST", "/patient", Some(json!({"firstName": "  ", "lastName": "Doe"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["errors"][0]["field"], "firstName");
    assert_eq!(body["errors"][0]["message"], "First name is required");

    let (status, _, body) = send(&app, "POST", "/patient", Some(json!({"firstName": "Jane", "lastName": "Doe", "email": "not-an-email"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "email");

    let (status, _, body) = send(&app, "POST", "/patient", Some(json!({"firstName": "Jane", "lastName": "Doe", "phoneNumber": "call me"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Invalid phone number format");

    let (_, _, body) = send(&app, "GET", "/patient/count", None).await;
    assert_eq!(body["count"], 0);

    // Single-label domains are valid addresses
    let (status, _, body) = send(&app, "POST", "/patient", Some(json!({"firstName": "Jane", "lastName": "Doe", "email": "jane@localhost"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "jane@localhost");
}

#[tokio::test]
async fn test_update_validates_and_reports_missing() {
    let app = app();

    let (status, _, _) = send(&app, "PUT", "/patient/9", Some(json!({"firstName": "Jane", "lastName": "Doe"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, "POST", "/patient", Some(json!({"firstName": "Jane", "lastName": "Doe"}))).await;
    let (status, _, _) = send(&app, "PUT", "/patient/1", Some(json!({"firstName": "Jane"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, body) = send(&app, "GET", "/patient/1", None).await;
    assert_eq!(body["lastName"], "Doe");

    let (status, _, _) = send(&app, "DELETE", "/patient/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_pagination_and_sort() {
    let app = app();
    for i in 0..25 {
        send(&app, "POST", "/patient", Some(json!({"firstName": format!("First{:02}", i), "lastName": format!("Last{:02}", i)}))).await;
    }

    // Defaults: page 0, size 10, id ascending
    let (status, _, body) = send(&app, "GET", "/patient", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"].as_array().unwrap().len(), 10);
    assert_eq!(body["totalElements"], 25);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["number"], 0);
    assert_eq!(body["size"], 10);
    assert_eq!(body["content"][0]["id"], 1);

    let (_, _, body) = send(&app, "GET", "/patient?page=2&size=10", None).await;
    assert_eq!(body["content"].as_array().unwrap().len(), 5);
    assert_eq!(body["last"], true);

    let (_, _, body) = send(&app, "GET", "/patient?sort=lastName,desc&size=3", None).await;
    assert_eq!(body["content"][0]["lastName"], "Last24");
    assert_eq!(body["content"][2]["lastName"], "Last22");
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let app = app();

    let (status, _, body) = send(&app, "GET", "/patient?sort=ssn,asc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "sort");

    let (status, _, _) = send(&app, "GET", "/patient?size=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "GET", "/patient?page=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "GET", "/patient/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_by_name() {
    let app = app();
    for (first, last) in [("Alice", "Johnson"), ("Bob", "Smith"), ("Carol", "Alito")] {
        send(&app, "POST", "/patient", Some(json!({"firstName": first, "lastName": last}))).await;
    }

    let (status, _, body) = send(&app, "GET", "/patient?search=ali", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 2);
    assert_eq!(body["content"][0]["firstName"], "Alice");
    assert_eq!(body["content"][1]["firstName"], "Carol");

    // Empty search falls back to the full listing
    let (_, _, body) = send(&app, "GET", "/patient?search=", None).await;
    assert_eq!(body["totalElements"], 3);
}

#[tokio::test]
async fn test_unpaginated_listing_and_count() {
    let app = app();
    send(&app, "POST", "/patient", Some(json!({"firstName": "Jane", "lastName": "Doe"}))).await;
    send(&app, "POST", "/patient", Some(json!({"firstName": "John", "lastName": "Roe"}))).await;

    let (status, _, body) = send(&app, "GET", "/patient/all", None).await;
    assert_eq!(status, StatusCode::OK);
    let all = body.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1]["firstName"], "John");

    let (_, _, body) = send(&app, "GET", "/patient/count", None).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_health_and_cors() {
    let app = app();

    let response = app.clone().oneshot(
        Request::builder()
            .method("GET")
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:8080")
            .body(Body::empty())
            .unwrap(),
    ).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:8080");

    let response = app.clone().oneshot(
        Request::builder()
            .method("GET")
            .uri("/health")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap(),
    ).await.unwrap();

    assert!(!response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
