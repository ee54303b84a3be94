use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserState {
    pub current_user: Option<StoredUser>,
    pub users: Vec<StoredUser>,
    pub loading: bool,
}

#[derive(Debug, Clone)]
pub struct UserStore {
    tx: watch::Sender<UserState>,
}

impl UserStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(UserState::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> UserState {
        self.tx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<StoredUser> {
        self.tx.borrow().current_user.clone()
    }

    pub fn users(&self) -> Vec<StoredUser> {
        self.tx.borrow().users.clone()
    }

    pub fn loading(&self) -> bool {
        self.tx.borrow().loading
    }

    pub fn set_current_user(&self, user: StoredUser) {
        self.tx.send_modify(|s| s.current_user = Some(user));
    }

    pub fn clear_current_user(&self) {
        self.tx.send_modify(|s| s.current_user = None);
    }

    pub fn set_users(&self, users: Vec<StoredUser>) {
        self.tx.send_modify(|s| s.users = users);
    }

    pub fn add_user(&self, user: StoredUser) {
        self.tx.send_modify(|s| s.users.push(user));
    }

    /// 새 사용자 생성. id는 현재 시각(ms) 기반이며 기존 id와 겹치면 최대값 + 1
    pub fn create_user(&self, name: &str, email: &str) -> StoredUser {
        let mut created = None;
        self.tx.send_modify(|s| {
            let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
            let max_id = s.users.iter().map(|u| u.id).max().unwrap_or(0);
            let id = if now > max_id { now } else { max_id + 1 };
            let user = StoredUser {
                id,
                name: name.to_string(),
                email: email.to_string(),
            };
            s.users.push(user.clone());
            created = Some(user);
        });
        created.unwrap_or_else(|| StoredUser {
            id: 0,
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    /// 없는 id면 `false`
    pub fn remove_user(&self, id: u64) -> bool {
        self.tx.send_if_modified(|s| {
            let before = s.users.len();
            s.users.retain(|u| u.id != id);
            s.users.len() != before
        })
    }

    /// 같은 id의 사용자를 교체. 없으면 `false`
    pub fn update_user(&self, user: StoredUser) -> bool {
        self.tx.send_if_modified(|s| match s.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user;
                true
            }
            None => false,
        })
    }

    pub fn set_loading(&self, loading: bool) {
        self.tx.send_modify(|s| s.loading = loading);
    }

    /// 목록이 비어 있을 때만 샘플 사용자 3명을 채움
    pub fn seed_defaults(&self) -> bool {
        self.tx.send_if_modified(|s| {
            if !s.users.is_empty() {
                return false;
            }
            s.users = [
                (1, "张三", "zhangsan@example.com"),
                (2, "李四", "lisi@example.com"),
                (3, "王五", "wangwu@example.com"),
            ]
            .into_iter()
            .map(|(id, name, email)| StoredUser {
                id,
                name: name.to_string(),
                email: email.to_string(),
            })
            .collect();
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.tx.subscribe()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
