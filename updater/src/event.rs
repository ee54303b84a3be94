//! 컨트롤러 이벤트 — 구독자(GUI/콘솔)에게 브로드캐스트
//!
//! 알림은 모두 fire-and-forget입니다. 컨트롤러는 구독자가 없어도 동작합니다.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UpdateEvent {
    /// 새 버전 발견 (info 알림, 클릭 시 프롬프트 재표시)
    UpdateFound { version: String },
    /// 업데이트 없음 — 사용자가 직접 체크한 경우에만
    CheckResult { message: String },
    /// 체크 실패 — 사용자가 직접 체크한 경우에만
    CheckFailed { error: String },
    /// 다운로드/설치 실패
    DownloadFailed { error: String },
    /// 이번 업데이트 건너뜀
    UpdateSkipped,
    /// 시뮬레이션 진행률 변경 (0..=100)
    ProgressChanged { percent: f64 },
    /// 설치 완료 모달. 확인 시 `acknowledge_install()` 호출
    InstallCompleted,
}

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// 사용자에게 보여줄 알림 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
    /// 확인 버튼이 있는 모달인지 여부
    pub modal: bool,
}

impl Notification {
    fn toast(level: NotificationLevel, title: &str, description: String) -> Self {
        Self {
            level,
            title: title.to_string(),
            description,
            modal: false,
        }
    }
}

impl UpdateEvent {
    /// 알림으로 표시할 이벤트면 내용을 돌려줌 (진행률 이벤트는 `None`)
    pub fn notification(&self) -> Option<Notification> {
        use NotificationLevel::*;

        let n = match self {
            Self::UpdateFound { version } => Notification::toast(
                Info,
                "发现新版本",
                format!("发现新版本 {}，点击立即更新", version),
            ),
            Self::CheckResult { message } => Notification::toast(Success, "检查更新", message.clone()),
            Self::CheckFailed { error } => Notification::toast(Error, "检查更新失败", error.clone()),
            Self::DownloadFailed { error } => Notification::toast(Error, "更新失败", error.clone()),
            Self::UpdateSkipped => Notification::toast(
                Info,
                "已跳过更新",
                "您可以稍后手动检查更新".to_string(),
            ),
            Self::InstallCompleted => Notification {
                level: Success,
                title: "更新完成".to_string(),
                description: "更新已成功安装，应用将重启以应用更新".to_string(),
                modal: true,
            },
            Self::ProgressChanged { .. } => return None,
        };
        Some(n)
    }
}
