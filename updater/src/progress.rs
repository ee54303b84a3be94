//! 다운로드 진행률 시뮬레이터
//!
//! **표시용입니다.** 백엔드는 다운로드~설치를 한 번의 요청으로 처리하고
//! 중간 진행률을 알려주지 않습니다. 이 값은 실제 전송 바이트와 무관하며,
//! 응답을 기다리는 동안 막대가 멈춰 보이지 않게 하는 용도입니다.
//! 시뮬레이터는 스스로 100에 도달하지 않으며, 완료 값은 항상 백엔드 응답이 정합니다.

use rand::Rng;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// 틱 간격
pub const PROGRESS_TICK: Duration = Duration::from_millis(500);
/// 시뮬레이터가 넘지 않는 상한
pub const PROGRESS_CEILING: f64 = 90.0;
/// 틱당 최대 증가량 (0 이상, 이 값 미만)
pub const MAX_TICK_INCREMENT: f64 = 10.0;

/// 다음 진행률 계산. 감소하지 않으며 상한에서 멈춤
pub fn advance(current: f64, increment: f64) -> f64 {
    if current >= PROGRESS_CEILING {
        return current;
    }
    (current + increment.max(0.0)).min(PROGRESS_CEILING)
}

/// 실행 중인 시뮬레이터 핸들. drop 시 틱 태스크도 중단됩니다.
#[derive(Debug)]
pub struct ProgressSimulator {
    handle: JoinHandle<()>,
}

impl ProgressSimulator {
    /// 틱마다 임의 증가량으로 `on_tick`을 호출합니다.
    /// `on_tick`이 `false`를 돌려주면 시뮬레이터가 스스로 종료합니다.
    pub fn start<F>(mut on_tick: F) -> Self
    where
        F: FnMut(f64) -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
            loop {
                ticker.tick().await;
                let increment = rand::thread_rng().gen_range(0.0..MAX_TICK_INCREMENT);
                if !on_tick(increment) {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn advance_is_clamped_to_ceiling() {
        assert_eq!(advance(0.0, 5.0), 5.0);
        assert_eq!(advance(88.0, 9.5), PROGRESS_CEILING);
        assert_eq!(advance(PROGRESS_CEILING, 3.0), PROGRESS_CEILING);
    }

    #[test]
    fn advance_never_decreases() {
        assert_eq!(advance(40.0, -3.0), 40.0);
        // 이미 상한 위라면 (완료 100 등) 건드리지 않음
        assert_eq!(advance(100.0, 5.0), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_callback_declines() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let sim = ProgressSimulator::start(move |inc| {
            assert!((0.0..MAX_TICK_INCREMENT).contains(&inc));
            counter.fetch_add(1, Ordering::SeqCst) < 2
        });

        tokio::time::sleep(PROGRESS_TICK * 10).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        tokio::time::sleep(PROGRESS_TICK * 10).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        drop(sim);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let sim = ProgressSimulator::start(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(PROGRESS_TICK + Duration::from_millis(10)).await;
        sim.stop();
        let seen = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(PROGRESS_TICK * 5).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
        assert_eq!(seen, 1);
    }
}
