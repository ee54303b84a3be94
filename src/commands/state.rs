//! 카운터 / 사용자 관리 화면용 상태 커맨드
//!
//! 저장소 값이 바뀌면 `counter-changed`, `users-changed` 이벤트로 화면에 알립니다.

use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;

use super::{CommandError, EventBus};
use crate::store::{CounterStore, StoredUser, UserState, UserStore};

pub const COUNTER_CHANGED_EVENT: &str = "counter-changed";
pub const USERS_CHANGED_EVENT: &str = "users-changed";

#[derive(Deserialize)]
pub(crate) struct AmountArgs {
    pub amount: i64,
}

#[derive(Deserialize)]
pub(crate) struct NewUserArgs {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub(crate) struct UserArgs {
    pub user: StoredUser,
}

#[derive(Deserialize)]
pub(crate) struct UsersArgs {
    pub users: Vec<StoredUser>,
}

#[derive(Deserialize)]
pub(crate) struct UserIdArgs {
    pub id: u64,
}

/// 사용자 관리 화면 진입: 목록이 비어 있으면 샘플 사용자로 채움
pub fn load_users(users: &UserStore) -> UserState {
    users.set_loading(true);
    if users.seed_defaults() {
        tracing::info!("[State] Seeded default users");
    }
    users.set_loading(false);
    users.snapshot()
}

pub fn create_user(users: &UserStore, name: &str, email: &str) -> Result<StoredUser, CommandError> {
    if name.trim().is_empty() || email.trim().is_empty() {
        return Err(CommandError::Failed("Name and email are required".to_string()));
    }
    let user = users.create_user(name.trim(), email.trim());
    tracing::info!("[State] Created user {} ({})", user.id, user.name);
    Ok(user)
}

pub fn update_user(users: &UserStore, user: StoredUser) -> Result<UserState, CommandError> {
    let id = user.id;
    if !users.update_user(user) {
        return Err(CommandError::Failed(format!("User {} not found", id)));
    }
    Ok(users.snapshot())
}

/// 삭제된 사용자가 현재 사용자였다면 현재 사용자도 해제
pub fn remove_user(users: &UserStore, id: u64) -> Result<UserState, CommandError> {
    if !users.remove_user(id) {
        return Err(CommandError::Failed(format!("User {} not found", id)));
    }
    if users.current_user().is_some_and(|u| u.id == id) {
        users.clear_current_user();
    }
    Ok(users.snapshot())
}

/// 저장소 변경을 이벤트 버스로 전달. 두 저장소가 모두 사라지면 끝납니다.
pub fn forward_changes(counter: &CounterStore, users: &UserStore, events: &EventBus) -> JoinHandle<()> {
    let mut counter_rx = counter.subscribe();
    let mut users_rx = users.subscribe();
    let events = events.clone();
    tokio::spawn(async move {
        let mut counter_open = true;
        let mut users_open = true;
        while counter_open || users_open {
            tokio::select! {
                changed = counter_rx.changed(), if counter_open => match changed {
                    Ok(()) => {
                        let value = *counter_rx.borrow_and_update();
                        events.emit(COUNTER_CHANGED_EVENT, json!({ "value": value }));
                    }
                    Err(_) => counter_open = false,
                },
                changed = users_rx.changed(), if users_open => match changed {
                    Ok(()) => {
                        let state = users_rx.borrow_and_update().clone();
                        events.emit(USERS_CHANGED_EVENT, json!(state));
                    }
                    Err(_) => users_open = false,
                },
            }
        }
        tracing::debug!("[State] Stores dropped, change forwarding stopped");
    })
}
