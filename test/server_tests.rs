use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use mbkanban::config::ServerConfig;
use mbkanban::handler::AppState;
use mbkanban::server::create_routes;
use mbkanban::storage::StorageManager;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOARD: &str = "### TASK_001: Fix bug
**Статус:** ⏳ Ожидает
**Приоритет:** 🔥 Критический
**Описание:** Something broke
- [x] Reproduce
- [ ] Fix

### TASK_002: Release
**Статус:** ✅ Завершено
**Приоритет:** 🔶 Низкий
";

fn setup() -> (TempDir, Router) {
    let temp_dir = TempDir::new().unwrap();
    let bank = temp_dir.path().join("bank");
    let public = temp_dir.path().join("public");
    std::fs::create_dir_all(bank.join("alpha")).unwrap();
    std::fs::create_dir_all(bank.join("empty")).unwrap();
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(bank.join("alpha").join("tasks.md"), BOARD).unwrap();
    std::fs::write(public.join("index.html"), "<h1>board</h1>").unwrap();

    let config = ServerConfig {
        memory_bank_path: bank.clone(),
        static_dir: public,
        ..ServerConfig::default()
    };
    let state = AppState::new(Arc::new(StorageManager::new(&bank))).unwrap();
    (temp_dir, create_routes(state, &config))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = setup();
    let (status, body) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "mbkanban");
}

#[tokio::test]
async fn test_list_projects() {
    let (_dir, app) = setup();
    let (status, body) = send_json(&app, Method::GET, "/api/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    let projects = body.as_array().unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0]["name"], "alpha");
    assert_eq!(projects[0]["taskCount"], 2);
    assert_eq!(projects[0]["activeCount"], 1);
    assert_eq!(projects[1]["name"], "empty");
    assert_eq!(projects[1]["taskCount"], 0);
}

#[tokio::test]
async fn test_get_tasks() {
    let (_dir, app) = setup();
    let (status, body) = send_json(&app, Method::GET, "/api/projects/alpha/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["id"], "TASK_001");
    assert_eq!(tasks[0]["title"], "Fix bug");
    assert_eq!(tasks[0]["status"], "waiting");
    assert_eq!(tasks[0]["priority"], "critical");
    assert_eq!(tasks[0]["description"], "Something broke");
    assert_eq!(tasks[0]["assignee"], "");
    assert_eq!(
        tasks[0]["subtasks"],
        json!([
            {"text": "Reproduce", "completed": true},
            {"text": "Fix", "completed": false}
        ])
    );
    assert!(tasks[0]["created"].is_string());
    assert_eq!(tasks[1]["status"], "completed");
}

#[tokio::test]
async fn test_missing_document_yields_empty_list() {
    let (_dir, app) = setup();
    let (status, body) = send_json(&app, Method::GET, "/api/projects/empty/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_invalid_project_name() {
    let (_dir, app) = setup();
    let (status, body) = send_json(&app, Method::GET, "/api/projects/bad.name/tasks", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid project name");

    let (status, _) = send_json(&app, Method::GET, "/api/projects/bad.name/stats", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats() {
    let (_dir, app) = setup();
    let (status, body) = send_json(&app, Method::GET, "/api/projects/alpha/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"total": 2, "active": 1, "completed": 1, "critical": 1, "completionRate": 50})
    );

    let (_, body) = send_json(&app, Method::GET, "/api/projects/empty/stats", None).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["completionRate"], 0);
}

#[tokio::test]
async fn test_update_status_persists() {
    let (dir, app) = setup();
    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/projects/alpha/tasks/TASK_001/status",
        Some(json!({"status": "in-progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "status": "🔄 В работе", "updated": true}));

    let on_disk = std::fs::read_to_string(dir.path().join("bank/alpha/tasks.md")).unwrap();
    assert_eq!(on_disk, BOARD.replacen("⏳ Ожидает", "🔄 В работе", 1));

    let (_, tasks) = send_json(&app, Method::GET, "/api/projects/alpha/tasks", None).await;
    assert_eq!(tasks[0]["status"], "in-progress");
    assert_eq!(tasks[1]["status"], "completed");
}

#[tokio::test]
async fn test_update_status_unknown_key_and_missing_field() {
    let (dir, app) = setup();
    let (_, body) = send_json(
        &app,
        Method::PUT,
        "/api/projects/alpha/tasks/TASK_002/status",
        Some(json!({"status": "archived"})),
    )
    .await;
    assert_eq!(body["status"], "⏳ Ожидает");

    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/projects/alpha/tasks/TASK_001/status",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "⏳ Ожидает");

    let on_disk = std::fs::read_to_string(dir.path().join("bank/alpha/tasks.md")).unwrap();
    assert!(!on_disk.contains("✅ Завершено"));
}

#[tokio::test]
async fn test_update_status_unknown_task_is_noop() {
    let (dir, app) = setup();
    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/projects/alpha/tasks/TASK_404/status",
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["updated"], false);

    let on_disk = std::fs::read_to_string(dir.path().join("bank/alpha/tasks.md")).unwrap();
    assert_eq!(on_disk, BOARD);
}

#[tokio::test]
async fn test_update_status_missing_document() {
    let (_dir, app) = setup();
    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/projects/empty/tasks/TASK_001/status",
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tasks file not found");
}

#[tokio::test]
async fn test_static_files_served_with_cache_header() {
    let (_dir, app) = setup();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=3600"
    );

    let (status, bytes) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"<h1>board</h1>".to_vec());
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let (_dir, app) = setup();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://board.test")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_invalid_utf8_document_still_served() {
    let (dir, app) = setup();
    let broken = dir.path().join("bank").join("broken");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join("tasks.md"), b"### TASK_1: A\n**\xff\xfe\n- [ ] step\n").unwrap();

    let (status, body) = send_json(&app, Method::GET, "/api/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "broken", "empty"]);

    let (status, tasks) = send_json(&app, Method::GET, "/api/projects/broken/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks[0]["id"], "TASK_1");
    assert_eq!(tasks[0]["subtasks"][0]["text"], "step");

    let (status, _) = send_json(&app, Method::GET, "/api/projects/broken/stats", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bundled_client_is_served() {
    let temp_dir = TempDir::new().unwrap();
    let config = ServerConfig {
        memory_bank_path: temp_dir.path().to_path_buf(),
        static_dir: std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("public"),
        ..ServerConfig::default()
    };
    let state = AppState::new(Arc::new(StorageManager::new(temp_dir.path()))).unwrap();
    let app = create_routes(state, &config);

    let (status, bytes) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(bytes).unwrap();
    assert!(page.contains("/api/projects"));
}
