//! 로컬 상태 저장소 (카운터, 사용자 목록)
//!
//! 각 저장소는 `tokio::sync::watch`로 값을 보관하고, 변경될 때마다 구독자에게 알립니다.
//! 영속화하지 않으며 프로세스 수명 동안만 유지됩니다.

pub mod counter;
pub mod users;

pub use counter::CounterStore;
pub use users::{StoredUser, UserState, UserStore};
