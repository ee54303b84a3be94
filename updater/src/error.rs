//! 업데이트 워크플로 에러 타입
//!
//! ## 분류
//! - 체크 요청 실패 (`Check`)
//! - 다운로드/설치 요청 실패 (`Install`)
//! - 재시작 요청 실패 (`Restart`) — 로그만 남기고 워크플로에는 영향 없음
//! - 백엔드 미연결 (`Unavailable`)
//!
//! 예상 밖의 정상 응답(마커 불일치)은 에러가 아니라 `response` 모듈에서
//! 정보성 응답으로 분류됩니다.

use serde::{Deserialize, Serialize};

/// 백엔드 호출 실패. `Display`는 사용자에게 그대로 보여줄 메시지만 출력합니다.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BackendError {
    #[error("{0}")]
    Check(String),

    #[error("{0}")]
    Install(String),

    #[error("{0}")]
    Restart(String),

    #[error("{0}")]
    Unavailable(String),
}

impl BackendError {
    /// 사용자 표시용 메시지 (`ControllerState::error`에 기록되는 값)
    pub fn message(&self) -> &str {
        match self {
            Self::Check(m) | Self::Install(m) | Self::Restart(m) | Self::Unavailable(m) => m,
        }
    }

    /// 로그용 분류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Check(_) => "check",
            Self::Install(_) => "install",
            Self::Restart(_) => "restart",
            Self::Unavailable(_) => "unavailable",
        }
    }
}
