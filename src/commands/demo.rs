//! 데모 커맨드 — 문자열, 구조체, 비동기, 에러, 이벤트 예제

use serde_json::{json, Value};
use std::time::Duration;

use super::{ApiResponse, EventBus, User};

pub const PROGRESS_EVENT: &str = "progress-update";
pub const TASK_COMPLETED_EVENT: &str = "task-completed";
const PROGRESS_STEP_INTERVAL: Duration = Duration::from_millis(50);
const MAX_NAME_LEN: usize = 50;

pub fn greet(name: &str) -> String {
    if name.is_empty() {
        tracing::warn!("[Commands] greet called with an empty name");
    }
    if name.chars().count() > MAX_NAME_LEN {
        tracing::warn!("[Commands] greet name too long: {} chars", name.chars().count());
    }
    format!("Hello, {}! You've been greeted from Rust!", name)
}

/// 이름은 대문자, 이메일은 소문자로 정규화
pub fn process_user(user: User) -> ApiResponse<User> {
    tracing::debug!("[Commands] process_user {:?}", user);
    let processed = User {
        name: user.name.to_uppercase(),
        email: user.email.to_lowercase(),
        ..user
    };
    ApiResponse::ok(processed, "User processed successfully")
}

pub async fn async_task(duration: u64) -> ApiResponse<String> {
    let started = tokio::time::Instant::now();
    tokio::time::sleep(Duration::from_secs(duration)).await;
    tracing::debug!("[Commands] async_task finished in {:?}", started.elapsed());

    ApiResponse::ok(
        format!("Task completed after {} seconds", duration),
        "Async task finished",
    )
}

pub fn get_system_info() -> ApiResponse<Value> {
    let info = json!({
        "platform": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "family": std::env::consts::FAMILY,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    ApiResponse::ok(info, "System info retrieved")
}

pub fn divide_numbers(a: f64, b: f64) -> Result<f64, String> {
    if b == 0.0 {
        tracing::error!("[Commands] divide_numbers: division by zero ({} / {})", a, b);
        return Err("Division by zero is not allowed".to_string());
    }
    Ok(a / b)
}

/// 백그라운드에서 0..=100 진행 이벤트를 보내고 바로 반환
pub fn start_progress_task(events: &EventBus) -> ApiResponse<String> {
    let events = events.clone();
    tokio::spawn(async move {
        for i in 0..=100u32 {
            events.emit(
                PROGRESS_EVENT,
                json!({
                    "progress": i,
                    "message": format!("Processing step {}/100", i),
                }),
            );
            tokio::time::sleep(PROGRESS_STEP_INTERVAL).await;
        }
        events.emit(
            TASK_COMPLETED_EVENT,
            json!({ "message": "Task completed successfully!" }),
        );
    });

    ApiResponse::ok("Progress task started".to_string(), "Background task initiated")
}

pub fn get_users() -> ApiResponse<Vec<User>> {
    let users = [
        (1, "Alice", "alice@example.com", 25),
        (2, "Bob", "bob@example.com", 30),
        (3, "Charlie", "charlie@example.com", 35),
    ]
    .into_iter()
    .map(|(id, name, email, age)| User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        age,
    })
    .collect();

    ApiResponse::ok(users, "Users retrieved successfully")
}
