use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use taskflow_backend::routes::router;
use taskflow_backend::state::AppState;
use taskflow_backend::suggest::NoopSuggestionClient;

async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    router(AppState {
        db: pool,
        created_hooks: Arc::new(Vec::new()),
        suggester: Arc::new(NoopSuggestionClient),
    })
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder
            .header("x-user-id", user)
            .header("x-user-email", format!("{user}@example.com"))
            .header("x-user-name", "Test User");
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn names(states: &Value) -> Vec<&str> {
    states
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn unauthenticated_reads_are_empty_and_mutations_are_noops() {
    let app = test_app().await;

    let (status, body) = send(&app, request("GET", "/todos", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, request("GET", "/states", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let new_todo = json!({
        "label": "Write report",
        "priority": "high",
        "stateId": "s1",
        "dueDate": "2026-09-01"
    });
    let (status, _) = send(&app, request("POST", "/todos", None, Some(new_todo))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // And nothing was written to anyone's partition.
    let (_, body) = send(&app, request("GET", "/todos", Some("u1"), None)).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn first_state_listing_seeds_the_defaults() {
    let app = test_app().await;

    let (status, body) = send(&app, request("GET", "/states", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["To-do", "In Progress", "Done", "Canceled"]);

    // A second listing does not seed again.
    let (_, body) = send(&app, request("GET", "/states", Some("u1"), None)).await;
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn adding_a_state_appends_and_duplicates_are_noops() {
    let app = test_app().await;
    send(&app, request("GET", "/states", Some("u1"), None)).await;

    let (status, body) = send(
        &app,
        request("POST", "/states", Some("u1"), Some(json!({"name": "Blocked"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names(&body),
        vec!["To-do", "In Progress", "Done", "Canceled", "Blocked"]
    );

    let (_, body) = send(
        &app,
        request("POST", "/states", Some("u1"), Some(json!({"name": "Blocked"}))),
    )
    .await;
    assert_eq!(
        names(&body),
        vec!["To-do", "In Progress", "Done", "Canceled", "Blocked"]
    );
}

#[tokio::test]
async fn todo_roundtrip_through_the_pipeline() {
    let app = test_app().await;

    let (_, states) = send(&app, request("GET", "/states", Some("u1"), None)).await;
    let todo_state = &states.as_array().unwrap()[0];
    assert_eq!(todo_state["name"], "To-do");
    let state_id = todo_state["id"].as_str().unwrap();

    let new_todo = json!({
        "label": "Write report",
        "description": "quarterly numbers",
        "priority": "high",
        "stateId": state_id,
        "dueDate": "2026-09-01"
    });
    let (status, created) = send(&app, request("POST", "/todos", Some("u1"), Some(new_todo))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(created["id"].as_str().is_some());

    let (status, body) = send(&app, request("GET", "/todos", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = &body.as_array().unwrap()[0];
    assert_eq!(listed["label"], "Write report");
    assert_eq!(listed["priority"], "high");
    assert_eq!(listed["state"], "To-do");
    assert_eq!(listed["dueDate"], "2026-09-01T00:00:00Z");
}

#[tokio::test]
async fn list_filters_are_applied_server_side() {
    let app = test_app().await;

    let (_, states) = send(&app, request("GET", "/states", Some("u1"), None)).await;
    let state_id = states.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

    for (label, priority) in [("Design landing page", "high"), ("Fix dashboard bug", "low")] {
        let body = json!({
            "label": label,
            "priority": priority,
            "stateId": state_id,
            "dueDate": "2026-09-01"
        });
        send(&app, request("POST", "/todos", Some("u1"), Some(body))).await;
    }

    let (_, body) = send(&app, request("GET", "/todos?priority=high", Some("u1"), None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["label"], "Design landing page");

    let (_, body) = send(&app, request("GET", "/todos?search=DASH", Some("u1"), None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["label"], "Fix dashboard bug");

    let (_, body) = send(&app, request("GET", "/todos?state=Done", Some("u1"), None)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (status, _) = send(&app, request("GET", "/todos?priority=urgent", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_validation_names_the_offending_field() {
    let app = test_app().await;

    let body = json!({
        "label": "   ",
        "priority": "low",
        "stateId": "s1",
        "dueDate": "2026-09-01"
    });
    let (status, body) = send(&app, request("POST", "/todos", Some("u1"), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "label");

    let body = json!({
        "label": "Write report",
        "priority": "low",
        "dueDate": "2026-09-01"
    });
    let (status, body) = send(&app, request("POST", "/todos", Some("u1"), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "state");
}

#[tokio::test]
async fn profile_is_created_lazily_and_merged() {
    let app = test_app().await;

    let (status, body) = send(&app, request("GET", "/me", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let patch = json!({"webhookUrl": "https://hooks.example.com/todo"});
    let (status, body) = send(&app, request("PATCH", "/me", Some("u1"), Some(patch))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "u1@example.com");
    assert_eq!(body["displayName"], "Test User");
    assert_eq!(body["webhookUrl"], "https://hooks.example.com/todo");

    let (_, body) = send(&app, request("GET", "/me", Some("u1"), None)).await;
    assert_eq!(body["webhookUrl"], "https://hooks.example.com/todo");
}

#[tokio::test]
async fn suggest_state_returns_no_suggestion_from_the_noop_client() {
    let app = test_app().await;
    send(&app, request("GET", "/states", Some("u1"), None)).await;

    let body = json!({"description": "finish the report", "dueDate": "tomorrow"});
    let (status, body) = send(&app, request("POST", "/suggest-state", Some("u1"), Some(body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestedState"], "");
}

#[tokio::test]
async fn deleting_a_state_leaves_todos_displayed_as_unknown() {
    let app = test_app().await;

    let (_, states) = send(&app, request("GET", "/states", Some("u1"), None)).await;
    let state_id = states.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

    let body = json!({
        "label": "Write report",
        "priority": "low",
        "stateId": state_id,
        "dueDate": "2026-09-01"
    });
    send(&app, request("POST", "/todos", Some("u1"), Some(body))).await;

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/states/{state_id}"), Some("u1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, request("GET", "/todos", Some("u1"), None)).await;
    assert_eq!(body[0]["state"], "Unknown");
}
