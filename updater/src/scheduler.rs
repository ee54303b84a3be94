//! 자동 체크 스케줄러
//!
//! ## 구성
//! 컨트롤러 인스턴스가 소유하는 두 개의 취소 가능한 태스크입니다.
//! 1. 시작 지연 태스크: `STARTUP_CHECK_DELAY` 후 한 번 체크
//! 2. 반복 태스크: `check_interval_minutes`마다 체크
//!
//! 두 태스크는 `stop()` 또는 drop 시 함께 중단됩니다. 전역 타이머는 없습니다.

use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::{ControllerConfig, MAX_CHECK_INTERVAL_MINUTES, STARTUP_CHECK_DELAY};

#[derive(Debug, Default)]
pub struct UpdateScheduler {
    startup: Option<JoinHandle<()>>,
    recurring: Option<JoinHandle<()>>,
}

impl UpdateScheduler {
    /// 스케줄 시작. `check`가 `false`를 돌려주면 (컨트롤러가 사라짐) 해당 태스크가 끝납니다.
    pub fn start<F, Fut>(config: &ControllerConfig, check: F) -> Self
    where
        F: Fn() -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        if !config.auto_check {
            tracing::info!("[Scheduler] Auto-check disabled");
            return Self::default();
        }

        let startup_check = check.clone();
        let startup = tokio::spawn(async move {
            tokio::time::sleep(STARTUP_CHECK_DELAY).await;
            tracing::info!("[Scheduler] Startup check triggered");
            startup_check().await;
        });

        let recurring = config.check_interval().map(|period| {
            tokio::spawn(async move {
                let Some(start) = Instant::now().checked_add(period) else {
                    tracing::warn!("[Scheduler] Interval {:?} out of range, recurring check disabled", period);
                    return;
                };
                let mut ticker = tokio::time::interval_at(start, period);
                loop {
                    ticker.tick().await;
                    tracing::info!("[Scheduler] Auto-check triggered");
                    if !check().await {
                        tracing::debug!("[Scheduler] Controller gone, stopping");
                        break;
                    }
                }
            })
        });

        if config.check_interval_minutes > MAX_CHECK_INTERVAL_MINUTES {
            tracing::warn!(
                "[Scheduler] check_interval_minutes={} exceeds limit, using {}",
                config.check_interval_minutes,
                MAX_CHECK_INTERVAL_MINUTES
            );
        }
        tracing::info!(
            "[Scheduler] Auto-check started (startup delay {}s, every {} minute(s), {} check(s)/day)",
            STARTUP_CHECK_DELAY.as_secs(),
            config.effective_interval_minutes(),
            config.checks_per_day()
        );

        Self {
            startup: Some(startup),
            recurring,
        }
    }

    /// 예약된 태스크가 하나라도 살아 있는지
    pub fn is_active(&self) -> bool {
        [&self.startup, &self.recurring]
            .into_iter()
            .flatten()
            .any(|h| !h.is_finished())
    }

    /// 두 태스크 모두 중단
    pub fn stop(&mut self) {
        let mut stopped = false;
        for handle in [self.startup.take(), self.recurring.take()].into_iter().flatten() {
            handle.abort();
            stopped = true;
        }
        if stopped {
            tracing::info!("[Scheduler] Auto-check stopped");
        }
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
