//! 네이티브 커맨드 백엔드
//!
//! 웹뷰의 `invoke(name, args)` 호출을 이름으로 디스패치합니다.
//! 인자와 결과는 모두 JSON이며, 업데이트 커맨드는 자유 형식 텍스트를 돌려줍니다.
//!
//! ## 커맨드
//! - 데모: `greet`, `process_user`, `async_task`, `get_system_info`, `divide_numbers`,
//!   `start_progress_task`, `get_users`
//! - 창: `manage_window`
//! - 업데이트: `check_for_updates`, `download_and_install_update`, `get_app_version`,
//!   `get_update_info`, `restart_app`
//! - 카운터: `counter_get`, `counter_increment`, `counter_decrement`,
//!   `counter_increment_by_amount`, `counter_reset`
//! - 사용자: `users_get`, `users_load`, `users_set`, `users_add`, `users_create`, `users_update`,
//!   `users_remove`, `users_set_current`, `users_clear_current`

pub mod demo;
pub mod events;
pub mod state;
pub mod updates;
pub mod window;

pub use events::{AppEvent, EventBus};
pub use updates::{CommandBackend, UpdateCommandError, UpdateCommands};
pub use window::{HeadlessWindow, WindowAction, WindowHandle};

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::ReleaseConfig;
use crate::release::{GitHubReleaseSource, ReleaseSource};
use crate::store::{CounterStore, UserStore};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub age: u32,
}

/// 데모 커맨드 공통 응답 봉투
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

/// 커맨드 디스패치 에러 — IPC 핸들러가 HTTP 상태 코드로 변환
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Invalid arguments for '{command}': {reason}")]
    InvalidArgs { command: String, reason: String },

    /// 커맨드가 돌려준 에러 문구 그대로
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Update(#[from] UpdateCommandError),
}

impl CommandError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownCommand(_) => StatusCode::NOT_FOUND,
            Self::InvalidArgs { .. } => StatusCode::BAD_REQUEST,
            Self::Failed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Update(UpdateCommandError::NotInitialized(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Update(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCommand(_) => "UNKNOWN_COMMAND",
            Self::InvalidArgs { .. } => "INVALID_ARGS",
            Self::Failed(_) => "COMMAND_FAILED",
            Self::Update(UpdateCommandError::NotInitialized(_)) => "UPDATER_NOT_INITIALIZED",
            Self::Update(_) => "UPDATE_FAILED",
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "ok": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        })
    }
}

impl axum::response::IntoResponse for CommandError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        (status, axum::Json(self.to_json())).into_response()
    }
}

#[derive(Deserialize)]
struct GreetArgs {
    name: String,
}

#[derive(Deserialize)]
struct ProcessUserArgs {
    user: User,
}

#[derive(Deserialize)]
struct AsyncTaskArgs {
    duration: u64,
}

#[derive(Deserialize)]
struct DivideArgs {
    a: f64,
    b: f64,
}

#[derive(Deserialize)]
struct WindowArgs {
    action: String,
}

fn parse_args<T: DeserializeOwned>(command: &str, args: Value) -> Result<T, CommandError> {
    serde_json::from_value(args).map_err(|e| CommandError::InvalidArgs {
        command: command.to_string(),
        reason: e.to_string(),
    })
}

fn to_value<T: Serialize>(value: T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError::Failed(e.to_string()))
}

/// 커맨드 디스패처. 복제해도 같은 이벤트 버스, 창, 업데이트 소스, 저장소를 공유합니다.
#[derive(Clone)]
pub struct CommandHub {
    events: EventBus,
    window: Arc<dyn WindowHandle>,
    updates: UpdateCommands,
    counter: CounterStore,
    users: UserStore,
}

impl CommandHub {
    pub fn new(events: EventBus, window: Arc<dyn WindowHandle>, updates: UpdateCommands) -> Self {
        Self {
            events,
            window,
            updates,
            counter: CounterStore::default(),
            users: UserStore::new(),
        }
    }

    /// 설정에서 업데이트 소스를 구성. 설정이 비었거나 잘못되면 "미초기화" 상태
    pub fn from_config(release: &ReleaseConfig, events: EventBus, window: Arc<dyn WindowHandle>) -> Self {
        let source: Option<Arc<dyn ReleaseSource>> = if release.is_configured() {
            match GitHubReleaseSource::new(release, updates::get_app_version()) {
                Ok(source) => Some(Arc::new(source) as Arc<dyn ReleaseSource>),
                Err(e) => {
                    tracing::warn!("[Commands] Release source unavailable: {}", e);
                    None
                }
            }
        } else {
            tracing::info!("[Commands] No release repository configured, updater disabled");
            None
        };
        Self::new(events, window, UpdateCommands::new(source))
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn updates(&self) -> &UpdateCommands {
        &self.updates
    }

    pub fn counter(&self) -> &CounterStore {
        &self.counter
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// 저장소 변경 이벤트 전달 시작
    pub fn forward_store_changes(&self) -> tokio::task::JoinHandle<()> {
        state::forward_changes(&self.counter, &self.users, &self.events)
    }

    /// 이름으로 커맨드 실행. 인자가 없는 커맨드는 `args`를 무시합니다.
    pub async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError> {
        tracing::debug!("[Commands] invoke {} {}", command, args);
        match command {
            "greet" => {
                let a: GreetArgs = parse_args(command, args)?;
                to_value(demo::greet(&a.name))
            }
            "process_user" => {
                let a: ProcessUserArgs = parse_args(command, args)?;
                to_value(demo::process_user(a.user))
            }
            "async_task" => {
                let a: AsyncTaskArgs = parse_args(command, args)?;
                to_value(demo::async_task(a.duration).await)
            }
            "get_system_info" => to_value(demo::get_system_info()),
            "divide_numbers" => {
                let a: DivideArgs = parse_args(command, args)?;
                let result = demo::divide_numbers(a.a, a.b).map_err(CommandError::Failed)?;
                to_value(result)
            }
            "start_progress_task" => to_value(demo::start_progress_task(&self.events)),
            "get_users" => to_value(demo::get_users()),
            "manage_window" => {
                let a: WindowArgs = parse_args(command, args)?;
                to_value(window::manage_window(self.window.as_ref(), &a.action))
            }
            "check_for_updates" => to_value(self.updates.check_for_updates().await?),
            "download_and_install_update" => {
                to_value(self.updates.download_and_install_update().await?)
            }
            "get_app_version" => to_value(updates::get_app_version()),
            "get_update_info" => Ok(self.updates.get_update_info().await?),
            "restart_app" => to_value(updates::restart_app(&self.events).await),
            "counter_get" => to_value(self.counter.value()),
            "counter_increment" => to_value(self.counter.increment()),
            "counter_decrement" => to_value(self.counter.decrement()),
            "counter_increment_by_amount" => {
                let a: state::AmountArgs = parse_args(command, args)?;
                to_value(self.counter.increment_by_amount(a.amount))
            }
            "counter_reset" => {
                self.counter.reset();
                to_value(self.counter.value())
            }
            "users_get" => to_value(self.users.snapshot()),
            "users_load" => to_value(state::load_users(&self.users)),
            "users_set" => {
                let a: state::UsersArgs = parse_args(command, args)?;
                self.users.set_users(a.users);
                to_value(self.users.snapshot())
            }
            "users_add" => {
                let a: state::UserArgs = parse_args(command, args)?;
                self.users.add_user(a.user);
                to_value(self.users.snapshot())
            }
            "users_create" => {
                let a: state::NewUserArgs = parse_args(command, args)?;
                to_value(state::create_user(&self.users, &a.name, &a.email)?)
            }
            "users_update" => {
                let a: state::UserArgs = parse_args(command, args)?;
                to_value(state::update_user(&self.users, a.user)?)
            }
            "users_remove" => {
                let a: state::UserIdArgs = parse_args(command, args)?;
                to_value(state::remove_user(&self.users, a.id)?)
            }
            "users_set_current" => {
                let a: state::UserArgs = parse_args(command, args)?;
                self.users.set_current_user(a.user);
                to_value(self.users.snapshot())
            }
            "users_clear_current" => {
                self.users.clear_current_user();
                to_value(self.users.snapshot())
            }
            _ => Err(CommandError::UnknownCommand(command.to_string())),
        }
    }
}
