//! 백엔드 응답 텍스트 분류
//!
//! 네이티브 백엔드는 구조화된 값 대신 자유 형식 문자열을 돌려줍니다.
//! 문자열 안의 고정 마커로 의미를 판정하며, 판정 규칙은 전부 이 모듈에 있습니다.
//! 백엔드가 태그된 응답을 돌려주게 되면 이 두 함수만 교체하면 됩니다.

use std::sync::OnceLock;

use regex::Regex;

/// 체크 응답: 새 버전 발견 마커
pub const UPDATE_FOUND_MARKER: &str = "发现新版本";
/// 체크 응답: 최신 상태
pub const UP_TO_DATE_MESSAGE: &str = "当前已是最新版本";
/// 설치 응답: 설치 완료 마커
pub const INSTALLED_MARKER: &str = "更新已安装";
/// 마커 뒤에 버전 토큰이 없을 때 쓰는 표시용 라벨
pub const UNKNOWN_VERSION: &str = "未知版本";
/// 백엔드가 릴리스 노트를 주지 않으므로 고정 문구를 사용
pub const DEFAULT_NOTES: &str = "发现新版本，包含 bug 修复和性能改进";

/// 체크 응답 분류 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResponse {
    /// 마커 발견. 버전 토큰이 없으면 `UNKNOWN_VERSION`
    UpdateAvailable { version: String },
    /// 마커 없음. 원문을 그대로 보존
    NoUpdate { message: String },
}

/// 설치 응답 분류 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResponse {
    Installed,
    /// 설치 마커가 없는 정상 응답 (예: "没有可用更新"). 에러로 취급하지 않음
    Informational { message: String },
}

fn version_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"发现新版本\s*[:：]\s*(\d+(?:\.\d+)*)").ok())
        .as_ref()
}

/// `check-for-updates` 응답 분류
pub fn parse_check_response(text: &str) -> CheckResponse {
    if !text.contains(UPDATE_FOUND_MARKER) {
        return CheckResponse::NoUpdate {
            message: text.to_string(),
        };
    }

    let version = version_pattern()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string());

    CheckResponse::UpdateAvailable { version }
}

/// `download-and-install-update` 응답 분류
pub fn parse_install_response(text: &str) -> InstallResponse {
    if text.contains(INSTALLED_MARKER) {
        InstallResponse::Installed
    } else {
        InstallResponse::Informational {
            message: text.to_string(),
        }
    }
}

/// 백엔드 쪽에서 체크 응답을 만들 때 사용 (마커 문구를 한 곳에서 관리)
pub fn format_update_found(version: &str) -> String {
    format!("{}: {}", UPDATE_FOUND_MARKER, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_dotted_version() {
        assert_eq!(
            parse_check_response("发现新版本: 2.3.1"),
            CheckResponse::UpdateAvailable { version: "2.3.1".into() }
        );
    }

    #[test]
    fn extracts_version_with_surrounding_text() {
        assert_eq!(
            parse_check_response("[updater] 发现新版本: 10.0 (当前版本: 9.9.9)"),
            CheckResponse::UpdateAvailable { version: "10.0".into() }
        );
    }

    #[test]
    fn trailing_dot_is_not_part_of_version() {
        assert_eq!(
            parse_check_response("发现新版本: 1.4.0."),
            CheckResponse::UpdateAvailable { version: "1.4.0".into() }
        );
    }

    #[test]
    fn marker_without_version_falls_back() {
        assert_eq!(
            parse_check_response("发现新版本"),
            CheckResponse::UpdateAvailable { version: UNKNOWN_VERSION.into() }
        );
        assert_eq!(
            parse_check_response("发现新版本: beta"),
            CheckResponse::UpdateAvailable { version: UNKNOWN_VERSION.into() }
        );
    }

    #[test]
    fn no_marker_keeps_raw_text() {
        assert_eq!(
            parse_check_response(UP_TO_DATE_MESSAGE),
            CheckResponse::NoUpdate { message: UP_TO_DATE_MESSAGE.into() }
        );
    }

    #[test]
    fn install_marker() {
        assert_eq!(parse_install_response("更新已安装，请重启应用"), InstallResponse::Installed);
        assert_eq!(
            parse_install_response("没有可用更新"),
            InstallResponse::Informational { message: "没有可用更新".into() }
        );
    }

    #[test]
    fn formatted_response_round_trips_through_parser() {
        let text = format_update_found("0.4.2");
        assert_eq!(text, "发现新版本: 0.4.2");
        assert_eq!(
            parse_check_response(&text),
            CheckResponse::UpdateAvailable { version: "0.4.2".into() }
        );
    }
}
