//! 백엔드 → 프론트엔드 이벤트 (`emit`/`listen` 쌍)

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppEvent {
    pub name: String,
    pub payload: Value,
}

#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// 이벤트 발행. 받은 리스너 수를 돌려줌 (리스너가 없으면 0)
    pub fn emit(&self, name: &str, payload: Value) -> usize {
        tracing::trace!("[Events] emit {}", name);
        self.tx
            .send(AppEvent {
                name: name.to_string(),
                payload,
            })
            .unwrap_or(0)
    }

    pub fn listen(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
