use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use helpdesk_db::{create_pool, run_migrations, DbRuntimeSettings};
use helpdesk_server::{app, config::Config, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tickets.db");
    let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    run_migrations(&pool.get().unwrap()).unwrap();

    let state = AppState::from_config(&Config::default(), pool).unwrap();
    (dir, app(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn jane(issue: &str) -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@x.com",
        "phone": "5551234",
        "address": "1 Main St",
        "issue_description": issue
    })
}

async fn create(app: &Router, issue: &str) -> Value {
    let (status, body) = send(app, Method::POST, "/tickets", Some(jane(issue))).await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    body
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_lookup_ticket() {
    let (_dir, app) = setup_app();

    let created = create(&app, "my wifi is not working").await;
    assert_eq!(created["success"], true);
    assert_eq!(created["id"], 1);
    assert_eq!(created["price"], 20);
    assert_eq!(created["issue"], "Network connectivity issues");
    let code = created["confirmation_code"].as_u64().unwrap();
    assert!((10_000..=99_999).contains(&code));

    let (status, found) = send(
        &app,
        Method::POST,
        "/tickets/lookup",
        Some(json!({"name": "JANE DOE", "email": " Jane@X.com", "confirmation_number": code})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["ticket"]["id"], 1);
    assert_eq!(
        found["message"],
        "Found your ticket! Your issue is: Network connectivity issues for $20"
    );

    let (status, fetched) = send(&app, Method::GET, "/tickets/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["ticket"]["phone"], "5551234");
    assert_eq!(fetched["ticket"]["confirmation_code"], code);
}

#[tokio::test]
async fn test_create_unsupported_issue() {
    let (_dir, app) = setup_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets",
        Some(jane("quantum teleportation")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["reason"], "unsupported_issue");
    assert!(body["error"].as_str().unwrap().contains("Printer problems ($10)"));

    let (_, list) = send(&app, Method::GET, "/tickets", None).await;
    assert!(list["tickets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_malformed_bodies() {
    let (_dir, app) = setup_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets",
        Some(json!({"name": "Jane Doe", "email": "jane@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_request");

    let mut blank = jane("wifi");
    blank["name"] = json!("   ");
    let (status, body) = send(&app, Method::POST, "/tickets", Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_request");
}

#[tokio::test]
async fn test_lookup_wrong_code_is_not_found() {
    let (_dir, app) = setup_app();
    let created = create(&app, "wifi").await;
    let code = created["confirmation_code"].as_u64().unwrap();
    let wrong = if code == 99_999 { 10_000 } else { code + 1 };

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets/lookup",
        Some(json!({"name": "Jane Doe", "email": "jane@x.com", "confirmation_code": wrong})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "not_found");
}

#[tokio::test]
async fn test_update_by_id() {
    let (_dir, app) = setup_app();
    create(&app, "wifi").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets/update-by-id",
        Some(json!({"ticket_id": 1, "field": "phone", "value": "5559999"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "5559999");
    assert!(body.get("price").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets/update-by-id",
        Some(json!({"ticket_id": 1, "field": "issue", "value": "forgot my password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "Password reset and login problems");
    assert_eq!(body["price"], 15);

    let (_, fetched) = send(&app, Method::GET, "/tickets/1", None).await;
    assert_eq!(fetched["ticket"]["phone"], "5559999");
    assert_eq!(fetched["ticket"]["price"], 15);
    assert_eq!(fetched["ticket"]["address"], "1 Main St");
}

#[tokio::test]
async fn test_update_by_id_rejections() {
    let (_dir, app) = setup_app();
    create(&app, "wifi").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets/update-by-id",
        Some(json!({"ticket_id": 1, "field": "price", "value": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_field");

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets/update-by-id",
        Some(json!({"ticket_id": 1, "field": "issue", "value": "haunted toaster"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "unsupported_issue");

    let (status, _) = send(
        &app,
        Method::POST,
        "/tickets/update-by-id",
        Some(json!({"ticket_id": 42, "field": "phone", "value": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_by_identity_limits_fields() {
    let (_dir, app) = setup_app();
    let created = create(&app, "wifi").await;
    let code = created["confirmation_code"].clone();

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets/update",
        Some(json!({
            "name": "Jane Doe", "email": "jane@x.com", "confirmation_code": code,
            "field": "email", "value": "other@x.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_field");

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets/update",
        Some(json!({
            "name": "jane doe", "email": "jane@x.com", "confirmation_code": code,
            "field": "address", "value": "22 Oak Ave"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticket_id"], 1);
    assert_eq!(
        body["message"],
        "Your ticket has been updated. Your address is now 22 Oak Ave."
    );

    let (_, fetched) = send(&app, Method::GET, "/tickets/1", None).await;
    assert_eq!(fetched["ticket"]["address"], "22 Oak Ave");
    assert_eq!(fetched["ticket"]["email"], "jane@x.com");
}

#[tokio::test]
async fn test_list_and_delete() {
    let (_dir, app) = setup_app();
    create(&app, "wifi").await;
    create(&app, "printer jam").await;

    let (status, list) = send(&app, Method::GET, "/tickets", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = list["tickets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1]);

    let (status, _) = send(&app, Method::DELETE, "/tickets/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/tickets/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::DELETE, "/tickets/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_supported_issues() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, Method::GET, "/supported-issues", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let issues = body["issues"].as_array().unwrap();
    let keys: Vec<&str> = issues.iter().map(|i| i["type"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["wifi", "email", "performance", "printer"]);
    assert_eq!(issues[2]["price"], 25);
    assert_eq!(issues[2]["description"], "CPU change and optimization");
}
