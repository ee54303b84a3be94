//! 컨트롤러 설정 — 생성 시 한 번 전달
//!
//! 호스트 설정 파일의 `[updater]` 섹션이 그대로 역직렬화됩니다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 앱 시작 직후 첫 자동 체크까지 대기 시간 (시작 작업과 경쟁하지 않도록)
pub const STARTUP_CHECK_DELAY: Duration = Duration::from_secs(5);
/// 설치 완료 후 완료 다이얼로그를 띄우기까지의 지연
pub const COMPLETION_DIALOG_DELAY: Duration = Duration::from_secs(1);
/// 반복 체크 간격 상한 (분, 30일). 더 큰 값은 이 값으로 잘립니다
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 30 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// 타이머 기반 자동 체크 사용 여부
    pub auto_check: bool,
    /// 반복 체크 간격 (분). 0이면 반복 체크 없음
    pub check_interval_minutes: u64,
    /// 사용자가 직접 누르는 "지금 확인" 버튼 표시 여부
    pub show_manual_trigger: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            auto_check: true,
            check_interval_minutes: 60,
            show_manual_trigger: true,
        }
    }
}

impl ControllerConfig {
    /// 반복 체크 간격. 비활성화 상태면 `None`
    pub fn check_interval(&self) -> Option<Duration> {
        if self.check_interval_minutes == 0 {
            return None;
        }
        Some(Duration::from_secs(self.effective_interval_minutes() * 60))
    }

    /// 상한을 적용한 반복 간격 (분)
    pub fn effective_interval_minutes(&self) -> u64 {
        self.check_interval_minutes.min(MAX_CHECK_INTERVAL_MINUTES)
    }

    /// 하루 반복 체크 횟수 (설정 화면 표시용)
    pub fn checks_per_day(&self) -> u64 {
        if self.check_interval_minutes == 0 {
            return 0;
        }
        (24 * 60) / self.effective_interval_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ControllerConfig::default();
        assert!(cfg.auto_check);
        assert!(cfg.show_manual_trigger);
        assert_eq!(cfg.check_interval(), Some(Duration::from_secs(3600)));
        assert_eq!(cfg.checks_per_day(), 24);
    }

    #[test]
    fn zero_interval_disables_recurring_check() {
        let cfg = ControllerConfig {
            check_interval_minutes: 0,
            ..Default::default()
        };
        assert_eq!(cfg.check_interval(), None);
        assert_eq!(cfg.checks_per_day(), 0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: ControllerConfig = serde_json::from_str(r#"{"check_interval_minutes": 15}"#).unwrap();
        assert!(cfg.auto_check);
        assert_eq!(cfg.check_interval_minutes, 15);
        assert_eq!(cfg.checks_per_day(), 96);
    }

    #[test]
    fn oversized_interval_is_clamped() {
        for minutes in [u64::MAX, u64::MAX / 60, MAX_CHECK_INTERVAL_MINUTES + 1] {
            let cfg = ControllerConfig {
                check_interval_minutes: minutes,
                ..Default::default()
            };
            assert_eq!(cfg.effective_interval_minutes(), MAX_CHECK_INTERVAL_MINUTES);
            assert_eq!(
                cfg.check_interval(),
                Some(Duration::from_secs(MAX_CHECK_INTERVAL_MINUTES * 60))
            );
            assert_eq!(cfg.checks_per_day(), 0);
        }
    }
}
