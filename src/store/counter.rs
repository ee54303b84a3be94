use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CounterStore {
    tx: watch::Sender<i64>,
}

impl CounterStore {
    pub fn new(initial: i64) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn value(&self) -> i64 {
        *self.tx.borrow()
    }

    pub fn increment(&self) -> i64 {
        self.increment_by_amount(1)
    }

    pub fn decrement(&self) -> i64 {
        self.increment_by_amount(-1)
    }

    /// 포화 덧셈 (오버플로 시 최대/최소값에서 멈춤)
    pub fn increment_by_amount(&self, amount: i64) -> i64 {
        self.tx.send_modify(|v| *v = v.saturating_add(amount));
        self.value()
    }

    pub fn reset(&self) {
        self.tx.send_replace(0);
    }

    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.tx.subscribe()
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new(0)
    }
}
