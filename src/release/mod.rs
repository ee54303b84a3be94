//! 업데이트 소스
//!
//! 최신 릴리스를 확인하고 플랫폼 에셋을 스테이징 디렉터리에 내려받습니다.
//! 서명 검증과 실제 바이너리 교체는 호스트(설치 프로그램)의 몫입니다.

pub mod github;

pub use github::GitHubReleaseSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ReleaseError {
    #[error("GitHub API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid release tag '{0}'")]
    InvalidTag(String),

    #[error("Release {tag} has no asset for {platform}")]
    NoAsset { tag: String, platform: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 다운로드 대상 에셋
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub size: u64,
    pub download_url: String,
}

/// 최신 릴리스 확인 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseCheck {
    pub current_version: String,
    pub latest_version: String,
    pub tag: String,
    pub has_update: bool,
    pub notes: Option<String>,
    pub published_at: Option<String>,
    pub html_url: Option<String>,
    /// 현재 플랫폼용 에셋 (없으면 다운로드 불가)
    pub asset: Option<ReleaseAsset>,
}

#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// 최신 릴리스 조회 + 실행 중 버전과 비교
    async fn check(&self) -> Result<ReleaseCheck, ReleaseError>;

    /// 확인된 릴리스의 에셋을 스테이징 디렉터리에 내려받고 경로를 돌려줌
    async fn download_and_install(&self, release: &ReleaseCheck) -> Result<PathBuf, ReleaseError>;
}

/// 스테이징 디렉터리 기본값: 사용자 캐시 아래 `showcase/updates`
pub fn default_staging_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .map(|appdata| PathBuf::from(appdata).join("showcase").join("updates"))
            .unwrap_or_else(|_| PathBuf::from("./updates"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".cache").join("showcase").join("updates"))
            .unwrap_or_else(|_| PathBuf::from("./updates"))
    }
}
