//! 업데이트 커맨드 + 컨트롤러용 백엔드 어댑터
//!
//! 응답은 프론트엔드와 맞춘 자유 형식 텍스트입니다.
//! | 커맨드 | 성공 | 실패 |
//! |---|---|---|
//! | `check_for_updates` | `发现新版本: X` / `当前已是最新版本` | `检查更新失败: …` |
//! | `download_and_install_update` | `更新已安装，应用将重启` / `没有可用更新` | `安装更新失败: …` |
//! | (소스 미설정) | | `check_for_updates`: `更新器未初始化，请检查配置`, 그 외: `更新器未初始化` |

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::{CommandError, CommandHub, EventBus};
use crate::release::{ReleaseError, ReleaseSource};
use showcase_updater::response::{format_update_found, UP_TO_DATE_MESSAGE};
use showcase_updater::{BackendError, UpdateBackend};

pub const UPDATER_NOT_INITIALIZED: &str = "更新器未初始化";
/// `check_for_updates` 전용. 설정 확인 안내가 붙음
pub const UPDATER_NOT_CONFIGURED: &str = "更新器未初始化，请检查配置";
pub const NO_UPDATE_AVAILABLE: &str = "没有可用更新";
pub const INSTALLED_RESTARTING: &str = "更新已安装，应用将重启";
pub const APP_RESTARTED: &str = "应用已重启";
/// `restart_app` 후 호스트가 실제 재시작을 수행하도록 알리는 이벤트
pub const RESTART_EVENT: &str = "app-restart";

const RESTART_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_UPDATE_NOTES: &str = "从 GitHub Releases 获取的最新版本";

#[derive(thiserror::Error, Debug)]
pub enum UpdateCommandError {
    /// 커맨드별 안내 문구를 그대로 담음
    #[error("{0}")]
    NotInitialized(&'static str),

    #[error("检查更新失败: {0}")]
    Check(#[source] ReleaseError),

    #[error("安装更新失败: {0}")]
    Install(#[source] ReleaseError),

    #[error("获取更新信息失败: {0}")]
    Info(#[source] ReleaseError),
}

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 실제 재시작은 호스트 몫. 잠시 기다린 뒤 재시작 이벤트만 발행
pub async fn restart_app(events: &EventBus) -> String {
    tracing::info!("[Updates] Restart requested");
    tokio::time::sleep(RESTART_DELAY).await;
    events.emit(RESTART_EVENT, json!({ "version": get_app_version() }));
    APP_RESTARTED.to_string()
}

#[derive(Clone, Default)]
pub struct UpdateCommands {
    source: Option<Arc<dyn ReleaseSource>>,
}

impl UpdateCommands {
    pub fn new(source: Option<Arc<dyn ReleaseSource>>) -> Self {
        Self { source }
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    fn source(&self, message: &'static str) -> Result<&dyn ReleaseSource, UpdateCommandError> {
        self.source.as_deref().ok_or_else(|| {
            tracing::error!("[Updates] Updater not initialized");
            UpdateCommandError::NotInitialized(message)
        })
    }

    pub async fn check_for_updates(&self) -> Result<String, UpdateCommandError> {
        let check = self.source(UPDATER_NOT_CONFIGURED)?.check().await.map_err(|e| {
            tracing::error!("[Updates] Check failed: {}", e);
            UpdateCommandError::Check(e)
        })?;

        if check.has_update {
            tracing::info!(
                "[Updates] New version {} (current {})",
                check.latest_version, check.current_version
            );
            Ok(format_update_found(&check.latest_version))
        } else {
            Ok(UP_TO_DATE_MESSAGE.to_string())
        }
    }

    /// 다시 확인한 뒤 새 버전이 있을 때만 내려받음
    pub async fn download_and_install_update(&self) -> Result<String, UpdateCommandError> {
        let source = self.source(UPDATER_NOT_INITIALIZED)?;
        let check = source.check().await.map_err(UpdateCommandError::Check)?;
        if !check.has_update {
            tracing::info!("[Updates] Nothing to install");
            return Ok(NO_UPDATE_AVAILABLE.to_string());
        }

        let staged = source.download_and_install(&check).await.map_err(|e| {
            tracing::error!("[Updates] Install failed: {}", e);
            UpdateCommandError::Install(e)
        })?;
        tracing::info!("[Updates] {} staged at {}", check.latest_version, staged.display());
        Ok(INSTALLED_RESTARTING.to_string())
    }

    pub async fn get_update_info(&self) -> Result<Value, UpdateCommandError> {
        let check = self.source(UPDATER_NOT_INITIALIZED)?.check().await.map_err(UpdateCommandError::Info)?;

        let release_date = check
            .published_at
            .as_deref()
            .and_then(|p| chrono::DateTime::parse_from_rfc3339(p).ok())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());
        let download_url = check
            .asset
            .as_ref()
            .map(|a| a.download_url.clone())
            .or(check.html_url.clone())
            .unwrap_or_else(|| "GitHub Releases".to_string());

        Ok(json!({
            "current_version": check.current_version,
            "latest_version": check.latest_version,
            "has_update": check.has_update,
            "update_notes": check.notes.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_UPDATE_NOTES),
            "download_url": download_url,
            "release_date": release_date,
        }))
    }
}

/// 업데이트 컨트롤러가 보는 백엔드. 커맨드를 이름으로 호출해
/// 웹뷰와 똑같은 텍스트 응답을 받습니다.
#[derive(Clone)]
pub struct CommandBackend {
    hub: CommandHub,
}

impl CommandBackend {
    pub fn new(hub: CommandHub) -> Self {
        Self { hub }
    }

    async fn invoke_text(&self, command: &str) -> Result<String, CommandError> {
        match self.hub.invoke(command, Value::Null).await? {
            Value::String(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }
}

fn backend_error(err: CommandError, wrap: fn(String) -> BackendError) -> BackendError {
    match err {
        CommandError::Update(UpdateCommandError::NotInitialized(_)) => {
            BackendError::Unavailable(err.to_string())
        }
        other => wrap(other.to_string()),
    }
}

#[async_trait]
impl UpdateBackend for CommandBackend {
    async fn check_for_updates(&self) -> Result<String, BackendError> {
        self.invoke_text("check_for_updates")
            .await
            .map_err(|e| backend_error(e, BackendError::Check))
    }

    async fn download_and_install_update(&self) -> Result<String, BackendError> {
        self.invoke_text("download_and_install_update")
            .await
            .map_err(|e| backend_error(e, BackendError::Install))
    }

    async fn restart_app(&self) -> Result<(), BackendError> {
        self.invoke_text("restart_app")
            .await
            .map(|_| ())
            .map_err(|e| backend_error(e, BackendError::Restart))
    }
}
