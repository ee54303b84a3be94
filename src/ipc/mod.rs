//! IPC HTTP 서버
//!
//! ## 엔드포인트
//! - `POST /api/invoke/:command` — 본문(JSON)을 인자로 커맨드 실행
//! - `GET  /api/health`          — 상태 확인
//! - `GET  /api/updater/state`   — 업데이트 컨트롤러 상태 (컨트롤러가 붙어 있을 때)

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::commands::{updates, CommandError, CommandHub};
use showcase_updater::UpdateController;

#[derive(Clone)]
pub struct IPCServer {
    pub hub: CommandHub,
    pub controller: Option<UpdateController>,
    pub listen_addr: String,
}

impl IPCServer {
    pub fn new(hub: CommandHub, listen_addr: &str) -> Self {
        Self {
            hub,
            controller: None,
            listen_addr: listen_addr.to_string(),
        }
    }

    pub fn with_controller(mut self, controller: UpdateController) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(health))
            .route("/api/invoke/:command", post(invoke_command))
            .route("/api/updater/state", get(updater_state))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    pub async fn start(self) -> Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("[IPC] Listening on http://{}", self.listen_addr);

        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// GET /api/health
async fn health(State(state): State<IPCServer>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "version": updates::get_app_version(),
        "updater_configured": state.hub.updates().is_configured(),
    }))
}

/// POST /api/invoke/:command — 빈 본문은 인자 없음(null)
async fn invoke_command(
    Path(command): Path<String>,
    State(state): State<IPCServer>,
    body: Bytes,
) -> Result<Json<Value>, CommandError> {
    let args = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| CommandError::InvalidArgs {
            command: command.clone(),
            reason: e.to_string(),
        })?
    };

    match state.hub.invoke(&command, args).await {
        Ok(data) => Ok(Json(json!({ "ok": true, "data": data }))),
        Err(e) => {
            tracing::warn!("[IPC] {} failed: {}", command, e);
            Err(e)
        }
    }
}

/// GET /api/updater/state
async fn updater_state(State(state): State<IPCServer>) -> impl IntoResponse {
    match &state.controller {
        Some(controller) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "state": controller.state() })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "ok": false,
                "error": "Update controller is not running",
                "error_code": "NO_CONTROLLER",
            })),
        ),
    }
}
