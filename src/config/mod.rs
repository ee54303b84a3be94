//! `config/showcase.toml` 로더
//!
//! ```toml
//! [updater]
//! auto_check = true
//! check_interval_minutes = 60
//! show_manual_trigger = true
//!
//! [release]
//! github_owner = "owner"
//! github_repo = "showcase"
//!
//! [ipc]
//! listen_addr = "127.0.0.1:57480"
//! ```
//!
//! 파일이 없거나 섹션이 빠져 있으면 기본값을 사용합니다.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use showcase_updater::ControllerConfig;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:57480";
const CONFIG_FILE: &str = "showcase.toml";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    pub updater: ControllerConfig,
    pub release: ReleaseConfig,
    pub ipc: IpcConfig,
}

/// 업데이트를 받아올 GitHub 저장소
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ReleaseConfig {
    pub github_owner: String,
    pub github_repo: String,
    /// API 베이스 URL 오버라이드 (mock 서버 테스트용)
    pub api_base_url: Option<String>,
    /// 다운로드 스테이징 디렉터리. 없으면 사용자 캐시 경로
    pub staging_dir: Option<String>,
    pub include_prerelease: bool,
}

impl ReleaseConfig {
    /// owner/repo가 모두 있어야 업데이트 소스를 만들 수 있음
    pub fn is_configured(&self) -> bool {
        !self.github_owner.trim().is_empty() && !self.github_repo.trim().is_empty()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct IpcConfig {
    pub listen_addr: String,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

impl GlobalConfig {
    /// 실행 파일 옆 → CWD 순서로 설정 파일을 찾아 로드
    pub fn load() -> anyhow::Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::info!("[Config] No {} found, using defaults", CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let cfg = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("[Config] Loaded {}", path.display());
        Ok(cfg)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn find_config_file() -> Option<PathBuf> {
    // 1. 실행 파일 옆 config/showcase.toml
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("config").join(CONFIG_FILE);
            if p.exists() {
                return Some(p);
            }
        }
    }

    // 2. CWD의 config/showcase.toml
    let p = PathBuf::from("config").join(CONFIG_FILE);
    p.exists().then_some(p)
}
