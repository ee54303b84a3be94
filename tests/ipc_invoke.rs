//! IPC 라우터 통합 테스트 — Axum 라우터를 직접 호출

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use showcase_core::commands::{CommandHub, EventBus, HeadlessWindow, UpdateCommands};
use showcase_core::ipc::IPCServer;
use showcase_core::updater::{ControllerConfig, UpdateController};

fn test_server() -> IPCServer {
    let events = EventBus::default();
    let window = Arc::new(HeadlessWindow::new(events.clone()));
    let hub = CommandHub::new(events, window, UpdateCommands::new(None));
    IPCServer::new(hub, "127.0.0.1:0")
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1024 * 64).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn invoke(command: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/invoke/{}", command))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_version_and_updater() {
    let app = test_server().router();
    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();

    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["updater_configured"], false);
}

#[tokio::test]
async fn invoke_greet() {
    let app = test_server().router();
    let (status, json) = send(&app, invoke("greet", &json!({ "name": "IPC" }).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "ok": true, "data": "Hello, IPC! You've been greeted from Rust!" }));
}

#[tokio::test]
async fn invoke_process_user_wraps_envelope() {
    let app = test_server().router();
    let body = json!({ "user": { "id": 1, "name": "kim", "email": "KIM@EXAMPLE.COM", "age": 20 } });
    let (status, json) = send(&app, invoke("process_user", &body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["success"], true);
    assert_eq!(json["data"]["data"]["name"], "KIM");
    assert_eq!(json["data"]["data"]["email"], "kim@example.com");
}

#[tokio::test]
async fn empty_body_means_no_arguments() {
    let app = test_server().router();
    let (status, json) = send(&app, invoke("get_users", "")).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["data"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Alice", "Bob", "Charlie"]);
}

#[tokio::test]
async fn error_statuses() {
    let app = test_server().router();

    let (status, json) = send(&app, invoke("no_such_command", "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_code"], "UNKNOWN_COMMAND");
    assert_eq!(json["ok"], false);

    let (status, json) = send(&app, invoke("greet", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "INVALID_ARGS");

    let (status, json) = send(&app, invoke("divide_numbers", r#"{"a": 4, "b": 0}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "Division by zero is not allowed");

    let (status, json) = send(&app, invoke("check_for_updates", "")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "更新器未初始化，请检查配置");

    for command in ["download_and_install_update", "get_update_info"] {
        let (status, json) = send(&app, invoke(command, "")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "更新器未初始化");
    }
}

#[tokio::test]
async fn counter_commands() {
    let server = test_server();
    let app = server.router();

    let (_, json) = send(&app, invoke("counter_get", "")).await;
    assert_eq!(json["data"], 0);
    send(&app, invoke("counter_increment", "")).await;
    send(&app, invoke("counter_increment", "")).await;
    let (_, json) = send(&app, invoke("counter_decrement", "")).await;
    assert_eq!(json["data"], 1);

    let (status, json) = send(&app, invoke("counter_increment_by_amount", r#"{"amount": -6}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], -5);
    assert_eq!(server.hub.counter().value(), -5);

    let (status, json) = send(&app, invoke("counter_increment_by_amount", r#"{"amount": "lots"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "INVALID_ARGS");

    let (_, json) = send(&app, invoke("counter_reset", "")).await;
    assert_eq!(json["data"], 0);
}

#[tokio::test]
async fn user_management_commands() {
    let server = test_server();
    let app = server.router();

    let (_, json) = send(&app, invoke("users_load", "")).await;
    assert_eq!(json["data"]["users"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"]["loading"], false);

    let (status, json) = send(
        &app,
        invoke("users_create", r#"{"name": "Dana", "email": "dana@example.com"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created = json["data"].clone();
    assert_eq!(created["name"], "Dana");

    let mut renamed = created.clone();
    renamed["name"] = json!("Dana K");
    let (_, json) = send(&app, invoke("users_update", &json!({ "user": renamed }).to_string())).await;
    assert_eq!(json["data"]["users"][3]["name"], "Dana K");

    let (_, json) = send(&app, invoke("users_set_current", &json!({ "user": renamed }).to_string())).await;
    assert_eq!(json["data"]["current_user"]["name"], "Dana K");

    // 현재 사용자를 지우면 현재 사용자도 해제
    let remove = json!({ "id": created["id"] }).to_string();
    let (_, json) = send(&app, invoke("users_remove", &remove)).await;
    assert!(json["data"]["current_user"].is_null());
    assert_eq!(server.hub.users().users().len(), 3);

    let (status, json) = send(&app, invoke("users_remove", &remove)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error_code"], "COMMAND_FAILED");

    let (_, json) = send(&app, invoke("users_set", r#"{"users": []}"#)).await;
    assert!(json["data"]["users"].as_array().unwrap().is_empty());
    let (_, json) = send(
        &app,
        invoke("users_add", r#"{"user": {"id": 9, "name": "Eve", "email": "eve@example.com"}}"#),
    )
    .await;
    assert_eq!(json["data"]["users"][0]["id"], 9);
    let (_, json) = send(&app, invoke("users_clear_current", "")).await;
    assert!(json["data"]["current_user"].is_null());
    let (_, json) = send(&app, invoke("users_get", "")).await;
    assert_eq!(json["data"]["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn manage_window_unknown_action_still_succeeds() {
    let app = test_server().router();
    let (status, json) = send(&app, invoke("manage_window", r#"{"action": "spin"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["data"], "Unknown action");
}

#[tokio::test]
async fn updater_state_requires_controller() {
    let server = test_server();
    let req = || Request::builder().uri("/api/updater/state").body(Body::empty()).unwrap();

    let (status, _) = send(&server.router(), req()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let config = ControllerConfig {
        auto_check: false,
        ..Default::default()
    };
    let backend = Arc::new(showcase_core::commands::CommandBackend::new(server.hub.clone()));
    let app = server.with_controller(UpdateController::new(config, backend)).router();

    let (status, json) = send(&app, req()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"]["checking"], false);
    assert_eq!(json["state"]["prompt_visible"], false);
}
