//! 창 조작 커맨드

use serde_json::json;

use super::{ApiResponse, EventBus};

/// 창 조작이 일어나면 발행되는 이벤트 (`{ "action": "minimize" }`)
pub const WINDOW_EVENT: &str = "window-action";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Minimize,
    Maximize,
    Close,
}

impl WindowAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "minimize" => Some(Self::Minimize),
            "maximize" => Some(Self::Maximize),
            "close" => Some(Self::Close),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimize => "minimize",
            Self::Maximize => "maximize",
            Self::Close => "close",
        }
    }

    fn done_message(&self) -> &'static str {
        match self {
            Self::Minimize => "Window minimized",
            Self::Maximize => "Window maximized",
            Self::Close => "Window closed",
        }
    }
}

/// 실제 창을 가진 호스트가 구현
pub trait WindowHandle: Send + Sync {
    fn apply(&self, action: WindowAction) -> Result<(), String>;
}

/// 창이 없는 콘솔 호스트용. 조작을 이벤트로만 알립니다.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    events: EventBus,
}

impl HeadlessWindow {
    pub fn new(events: EventBus) -> Self {
        Self { events }
    }
}

impl WindowHandle for HeadlessWindow {
    fn apply(&self, action: WindowAction) -> Result<(), String> {
        tracing::info!("[Window] {}", action.as_str());
        self.events.emit(WINDOW_EVENT, json!({ "action": action.as_str() }));
        Ok(())
    }
}

/// 알 수 없는 동작도 성공 봉투로 "Unknown action"을 돌려줌
pub fn manage_window(window: &dyn WindowHandle, action: &str) -> ApiResponse<String> {
    let Some(parsed) = WindowAction::parse(action) else {
        tracing::warn!("[Window] Unknown action '{}'", action);
        return ApiResponse::ok("Unknown action".to_string(), "Window action executed");
    };

    match window.apply(parsed) {
        Ok(()) => ApiResponse::ok(parsed.done_message().to_string(), "Window action executed"),
        Err(e) => {
            tracing::error!("[Window] {} failed: {}", parsed.as_str(), e);
            ApiResponse::failed(format!("Window action failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenWindow;

    impl WindowHandle for BrokenWindow {
        fn apply(&self, _action: WindowAction) -> Result<(), String> {
            Err("no display".into())
        }
    }

    #[tokio::test]
    async fn headless_window_reports_action() {
        let events = EventBus::default();
        let mut rx = events.listen();
        let window = HeadlessWindow::new(events);

        let resp = manage_window(&window, "maximize");
        assert_eq!(resp.data.as_deref(), Some("Window maximized"));
        assert_eq!(rx.recv().await.unwrap().payload["action"], "maximize");
    }

    #[test]
    fn unknown_action_is_not_an_error() {
        let window = HeadlessWindow::new(EventBus::default());
        let resp = manage_window(&window, "fullscreen");
        assert!(resp.success);
        assert_eq!(resp.data.as_deref(), Some("Unknown action"));
    }

    #[test]
    fn handle_failure_is_reported() {
        let resp = manage_window(&BrokenWindow, "close");
        assert!(!resp.success);
        assert!(resp.message.contains("no display"));
    }
}
