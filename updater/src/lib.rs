//! # showcase 업데이터 라이브러리
//!
//! 데스크톱 셸의 업데이트 확인/설치 워크플로를 담당합니다.
//! 실제 확인·다운로드·설치·재시작은 네이티브 백엔드(`UpdateBackend`)에 위임하고,
//! 이 크레이트는 상태 전이, 알림, 스케줄, 표시용 진행률만 관리합니다.
//!
//! ## 구성
//! - **컨트롤러(controller.rs)**: 체크/다운로드/건너뛰기/재시작 확인, 재진입 방지
//! - **응답 분류(response.rs)**: 백엔드 자유 형식 응답의 마커 판정
//! - **진행률(progress.rs)**: 응답 대기 중 표시용 진행률 시뮬레이터
//! - **스케줄러(scheduler.rs)**: 시작 지연 체크 + 주기 체크
//! - **이벤트(event.rs)**: GUI/콘솔에 브로드캐스트되는 알림
//! - **버전(version.rs)**: 릴리스 태그 비교 (백엔드 구현에서 사용)
//!
//! ## 백엔드 응답 규약
//! | 작업 | 성공 응답 |
//! |---|---|
//! | check-for-updates | `发现新版本: 1.2.3` 또는 `当前已是最新版本` |
//! | download-and-install-update | `更新已安装…` 또는 정보성 문구 |
//! | restart-app | 없음 |

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod progress;
pub mod response;
pub mod scheduler;
pub mod version;


pub use backend::UpdateBackend;
pub use config::ControllerConfig;
pub use controller::UpdateController;
pub use error::BackendError;
pub use event::{Notification, NotificationLevel, UpdateEvent};
pub use response::{CheckResponse, InstallResponse};
pub use version::ReleaseVersion;

use serde::{Deserialize, Serialize};

// ══════════════════════════════════════════════════════
// 상태
// ══════════════════════════════════════════════════════

/// 발견된 업데이트 정보. 체크할 때마다 통째로 교체됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub version: String,
    /// 백엔드가 릴리스 노트를 주지 않으므로 처음엔 고정 문구.
    /// 설치 응답이 정보성 문구면 그 문구로 바뀝니다.
    pub notes: String,
    /// `UpdateInfo`가 존재하면 항상 true
    pub available: bool,
}

impl UpdateInfo {
    pub fn discovered(version: &str) -> Self {
        Self {
            version: version.to_string(),
            notes: response::DEFAULT_NOTES.to_string(),
            available: true,
        }
    }
}

/// 컨트롤러가 단독 소유하는 상태. 프로세스 수명 동안만 유지됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub checking: bool,
    pub downloading: bool,
    /// 0..=100. `downloading` 중에만 의미 있음. 한 시도 안에서는 감소하지 않음
    pub download_progress: f64,
    pub update_info: Option<UpdateInfo>,
    /// 마지막 에러. 새 체크/다운로드 시작 시 지워짐
    pub error: Option<String>,
    pub prompt_visible: bool,
    /// 설치 완료 모달이 떠 있고 확인을 기다리는 중
    pub restart_pending: bool,
    /// 마지막 체크 완료 시각 (RFC 3339)
    pub last_checked_at: Option<String>,
}

impl ControllerState {
    /// 진행률 막대 표시값 (정수 %)
    pub fn progress_percent(&self) -> u8 {
        self.download_progress.round().clamp(0.0, 100.0) as u8
    }
}

// ══════════════════════════════════════════════════════
// 작업 결과
// ══════════════════════════════════════════════════════

/// `check_for_updates` 결과
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// 이미 체크 중이라 아무것도 하지 않음
    AlreadyChecking,
    UpdateAvailable(UpdateInfo),
    NoUpdate { message: String },
    Failed(BackendError),
}

/// `download_and_install` 결과
#[derive(Debug, Clone, PartialEq)]
pub enum InstallOutcome {
    /// 이미 다운로드 중이라 아무것도 하지 않음
    AlreadyDownloading,
    Installed,
    /// 설치 마커가 없는 정상 응답 (노트에 반영됨)
    Informational { message: String },
    Failed(BackendError),
}

/// 상태를 JSON 문자열로 직렬화 (웹뷰/IPC 전달용)
pub fn state_to_json(state: &ControllerState) -> String {
    serde_json::to_string(state).unwrap_or_else(|_| "{}".to_string())
}
