//! 통합 테스트 공용 유틸리티 — 로컬 모킹 GitHub API 서버

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use showcase_core::config::ReleaseConfig;

/// 현재 플랫폼에서 선택되는 에셋 이름
pub fn platform_asset_name() -> String {
    format!("showcase-{}-{}.bin", std::env::consts::OS, std::env::consts::ARCH)
}

/// 릴리스 JSON. 에셋 URL은 `{base}/download/{name}`
pub fn release_json(base: &str, tag: &str, draft: bool, prerelease: bool, assets: &[String]) -> Value {
    let assets: Vec<Value> = assets
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "size": 4,
                "browser_download_url": format!("{}/download/{}", base, name),
            })
        })
        .collect();

    json!({
        "tag_name": tag,
        "name": format!("{} Release", tag),
        "body": "Test release notes\n- Fixed bugs",
        "prerelease": prerelease,
        "draft": draft,
        "published_at": "2026-02-13T00:00:00Z",
        "html_url": format!("https://github.com/acme/showcase/releases/tag/{}", tag),
        "assets": assets,
    })
}

#[derive(Clone)]
struct MockState {
    releases: Arc<Vec<Value>>,
    files: Arc<HashMap<String, Vec<u8>>>,
}

pub struct MockGitHub {
    pub addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl MockGitHub {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn release_config(&self, staging: &std::path::Path, include_prerelease: bool) -> ReleaseConfig {
        ReleaseConfig {
            github_owner: "acme".into(),
            github_repo: "showcase".into(),
            api_base_url: Some(self.base_url()),
            staging_dir: Some(staging.to_string_lossy().to_string()),
            include_prerelease,
        }
    }
}

impl Drop for MockGitHub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// 모킹 서버 시작. `releases`는 베이스 URL을 받아 최신순 릴리스 목록을 만듭니다.
pub async fn start_mock_github(
    releases: impl FnOnce(&str) -> Vec<Value>,
    files: HashMap<String, Vec<u8>>,
) -> MockGitHub {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = MockState {
        releases: Arc::new(releases(&format!("http://{}", addr))),
        files: Arc::new(files),
    };

    let app = Router::new()
        .route("/repos/:owner/:repo/releases", get(list_releases))
        .route("/repos/:owner/:repo/releases/latest", get(latest_release))
        .route("/download/:filename", get(download))
        .with_state(state);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockGitHub { addr, handle }
}

/// 단일 릴리스 + 플랫폼 에셋을 서빙하는 가장 흔한 구성
pub async fn start_single_release(tag: &str, payload: &[u8]) -> MockGitHub {
    let asset = platform_asset_name();
    let tag = tag.to_string();
    let files = HashMap::from([(asset.clone(), payload.to_vec())]);
    start_mock_github(
        move |base| vec![release_json(base, &tag, false, false, &[asset, "latest.json".into()])],
        files,
    )
    .await
}

async fn list_releases(State(s): State<MockState>) -> Json<Value> {
    Json(Value::Array(s.releases.to_vec()))
}

async fn latest_release(State(s): State<MockState>) -> Response {
    // GitHub처럼 draft/prerelease 제외
    match s.releases.iter().find(|r| r["draft"] == false && r["prerelease"] == false) {
        Some(r) => Json(r.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
    }
}

async fn download(Path(filename): Path<String>, State(s): State<MockState>) -> Response {
    match s.files.get(&filename) {
        Some(data) => (
            StatusCode::OK,
            [("content-type", "application/octet-stream")],
            data.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
