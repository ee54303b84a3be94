//! 업데이트 워크플로 컨트롤러
//!
//! ## 상태 전이
//! `Idle → Checking → {Idle, PromptVisible}`
//! `PromptVisible → Downloading → {Idle(성공, 재시작 대기), PromptVisible(정보성 응답), PromptVisible(에러 표시)}`
//!
//! ## 동시성
//! - 같은 작업의 재진입은 `checking`/`downloading` 플래그로만 막습니다 (두 번째 호출은 no-op).
//! - 상태 락은 await 지점을 넘어서 잡지 않습니다.
//! - 진행률 시뮬레이터와 백엔드 응답은 독립적으로 경쟁하며, 성공 응답이 항상 100으로 덮어씁니다.
//! - 진행 중인 체크/다운로드는 취소할 수 없습니다. 다운로드 중에는 프롬프트를 닫을 수 없습니다.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::backend::UpdateBackend;
use crate::config::{ControllerConfig, COMPLETION_DIALOG_DELAY};
use crate::event::UpdateEvent;
use crate::progress::{self, ProgressSimulator, PROGRESS_CEILING};
use crate::response::{parse_check_response, parse_install_response, CheckResponse, InstallResponse};
use crate::scheduler::UpdateScheduler;
use crate::{CheckOutcome, ControllerState, InstallOutcome, UpdateInfo};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 업데이트 워크플로 컨트롤러. 복제해도 같은 인스턴스를 가리킵니다.
#[derive(Clone)]
pub struct UpdateController {
    inner: Arc<Inner>,
}

struct Inner {
    config: ControllerConfig,
    backend: Arc<dyn UpdateBackend>,
    state: RwLock<ControllerState>,
    events: broadcast::Sender<UpdateEvent>,
    /// 다운로드 시도 번호 (시뮬레이터 틱 펜스)
    attempts: AtomicU64,
    /// 현재 진행률을 쓸 수 있는 시도 번호. 0이면 아무도 쓸 수 없음
    live_ticker: AtomicU64,
    simulator: Mutex<Option<ProgressSimulator>>,
    completion: Mutex<Option<JoinHandle<()>>>,
    scheduler: Mutex<Option<UpdateScheduler>>,
    disposed: AtomicBool,
}

impl Inner {
    fn emit(&self, event: UpdateEvent) {
        // 구독자가 없으면 Err — 무시
        let _ = self.events.send(event);
    }

    fn stop_simulator(&self) {
        self.live_ticker.store(0, Ordering::SeqCst);
        if let Some(sim) = self.simulator.lock().take() {
            sim.stop();
        }
    }
}

/// 진행 중 플래그를 모든 종료 경로(에러, 호출 측 future drop 포함)에서 내려줍니다.
enum BusyGuard<'a> {
    Checking(&'a Inner),
    Downloading(&'a Inner),
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        match self {
            Self::Checking(inner) => inner.state.write().checking = false,
            Self::Downloading(inner) => {
                inner.stop_simulator();
                inner.state.write().downloading = false;
            }
        }
    }
}

impl UpdateController {
    pub fn new(config: ControllerConfig, backend: Arc<dyn UpdateBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                config,
                backend,
                state: RwLock::new(ControllerState::default()),
                events,
                attempts: AtomicU64::new(0),
                live_ticker: AtomicU64::new(0),
                simulator: Mutex::new(None),
                completion: Mutex::new(None),
                scheduler: Mutex::new(None),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// 생성 + 자동 체크 스케줄 시작 (호스트 화면에 마운트될 때)
    pub fn mount(config: ControllerConfig, backend: Arc<dyn UpdateBackend>) -> Self {
        let controller = Self::new(config, backend);
        controller.start_schedule();
        controller
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// 현재 상태 스냅샷
    pub fn state(&self) -> ControllerState {
        self.inner.state.read().clone()
    }

    /// 이벤트 구독
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.inner.events.subscribe()
    }

    /// 수동 체크 버튼을 그려야 하는지
    pub fn shows_manual_trigger(&self) -> bool {
        self.inner.config.show_manual_trigger
    }

    /// 프롬프트를 닫을 수 있는지 (다운로드 중에는 불가)
    pub fn can_close_prompt(&self) -> bool {
        !self.inner.state.read().downloading
    }

    // ─── 스케줄 ────────────────────────────────────────────────

    /// 자동 체크 스케줄 시작. 기존 스케줄은 먼저 중단됩니다.
    pub fn start_schedule(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let check = move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) if !inner.disposed.load(Ordering::SeqCst) => {
                        // 별도 태스크로 실행: 스케줄이 중단돼도 이미 보낸 요청은 끝까지 처리
                        let controller = UpdateController { inner };
                        let _ = tokio::spawn(async move { controller.check_for_updates(false).await }).await;
                        true
                    }
                    _ => false,
                }
            }
        };

        let scheduler = UpdateScheduler::start(&self.inner.config, check);
        let previous = self.inner.scheduler.lock().replace(scheduler);
        drop(previous);
        self.inner.disposed.store(false, Ordering::SeqCst);
    }

    /// 컨트롤러 해제 (호스트 화면 언마운트). 모든 타이머를 정리합니다.
    /// 진행 중인 백엔드 요청은 취소되지 않습니다.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
        if let Some(mut scheduler) = self.inner.scheduler.lock().take() {
            scheduler.stop();
        }
        let pending = self.inner.completion.lock().take();
        if let Some(handle) = pending {
            handle.abort();
        }
        self.inner.stop_simulator();
        tracing::info!("[Updater] Controller disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    // ─── 업데이트 확인 ──────────────────────────────────────────

    /// 업데이트 확인.
    ///
    /// `notify_on_no_update`는 사용자가 직접 누른 체크인지 여부입니다.
    /// 직접 누른 경우에만 "업데이트 없음"과 실패를 알림으로 표시합니다.
    pub async fn check_for_updates(&self, notify_on_no_update: bool) -> CheckOutcome {
        {
            let mut state = self.inner.state.write();
            if state.checking {
                tracing::debug!("[Updater] Check already in progress, ignoring");
                return CheckOutcome::AlreadyChecking;
            }
            state.checking = true;
            state.error = None;
        }
        let _busy = BusyGuard::Checking(&self.inner);

        tracing::info!("[Updater] Checking for updates (manual={})", notify_on_no_update);
        let result = self.inner.backend.check_for_updates().await;
        let checked_at = chrono::Utc::now().to_rfc3339();

        match result {
            Ok(text) => match parse_check_response(&text) {
                CheckResponse::UpdateAvailable { version } => {
                    let info = UpdateInfo::discovered(&version);
                    {
                        let mut state = self.inner.state.write();
                        state.update_info = Some(info.clone());
                        state.prompt_visible = true;
                        state.last_checked_at = Some(checked_at);
                    }
                    tracing::info!("[Updater] New version found: {}", version);
                    self.inner.emit(UpdateEvent::UpdateFound { version });
                    CheckOutcome::UpdateAvailable(info)
                }
                CheckResponse::NoUpdate { message } => {
                    self.inner.state.write().last_checked_at = Some(checked_at);
                    tracing::info!("[Updater] No update: {}", message);
                    if notify_on_no_update {
                        self.inner.emit(UpdateEvent::CheckResult {
                            message: message.clone(),
                        });
                    }
                    CheckOutcome::NoUpdate { message }
                }
            },
            Err(err) => {
                {
                    let mut state = self.inner.state.write();
                    state.error = Some(err.message().to_string());
                    state.last_checked_at = Some(checked_at);
                }
                tracing::error!("[Updater] Check failed: {}", err);
                if notify_on_no_update {
                    self.inner.emit(UpdateEvent::CheckFailed {
                        error: err.message().to_string(),
                    });
                }
                CheckOutcome::Failed(err)
            }
        }
    }

    // ─── 다운로드 및 설치 ────────────────────────────────────────

    /// 다운로드 + 설치. 백엔드 요청 하나가 전체 과정을 처리합니다.
    pub async fn download_and_install(&self) -> InstallOutcome {
        let attempt = {
            let mut state = self.inner.state.write();
            if state.downloading {
                tracing::debug!("[Updater] Download already in progress, ignoring");
                return InstallOutcome::AlreadyDownloading;
            }
            state.downloading = true;
            state.error = None;
            state.download_progress = 0.0;
            self.inner.attempts.fetch_add(1, Ordering::SeqCst) + 1
        };
        let _busy = BusyGuard::Downloading(&self.inner);

        tracing::info!("[Updater] Downloading and installing update (attempt {})", attempt);
        self.inner.emit(UpdateEvent::ProgressChanged { percent: 0.0 });
        self.start_simulator(attempt);

        let result = self.inner.backend.download_and_install_update().await;
        self.inner.stop_simulator();

        match result {
            Ok(text) => match parse_install_response(&text) {
                InstallResponse::Installed => {
                    {
                        let mut state = self.inner.state.write();
                        state.download_progress = 100.0;
                        state.prompt_visible = false;
                        state.update_info = None;
                        self.inner.emit(UpdateEvent::ProgressChanged { percent: 100.0 });
                    }
                    tracing::info!("[Updater] Update installed: {}", text);
                    self.schedule_completion_dialog();
                    InstallOutcome::Installed
                }
                InstallResponse::Informational { message } => {
                    if let Some(info) = self.inner.state.write().update_info.as_mut() {
                        info.notes = message.clone();
                    }
                    tracing::warn!("[Updater] Install finished without installed marker: {}", message);
                    InstallOutcome::Informational { message }
                }
            },
            Err(err) => {
                self.inner.state.write().error = Some(err.message().to_string());
                tracing::error!("[Updater] Download/install failed: {}", err);
                self.inner.emit(UpdateEvent::DownloadFailed {
                    error: err.message().to_string(),
                });
                InstallOutcome::Failed(err)
            }
        }
    }

    fn start_simulator(&self, attempt: u64) {
        self.inner.live_ticker.store(attempt, Ordering::SeqCst);
        let weak = Arc::downgrade(&self.inner);
        let simulator = ProgressSimulator::start(move |increment| {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            // 펜스 확인과 이벤트 발송 모두 상태 락 안에서. 응답 처리 이후에는 절대 쓰지 않음
            let mut state = inner.state.write();
            if !state.downloading || inner.live_ticker.load(Ordering::SeqCst) != attempt {
                return false;
            }
            state.download_progress = progress::advance(state.download_progress, increment);
            let percent = state.download_progress;
            inner.emit(UpdateEvent::ProgressChanged { percent });
            percent < PROGRESS_CEILING
        });

        let previous = self.inner.simulator.lock().replace(simulator);
        drop(previous);
    }

    fn schedule_completion_dialog(&self) {
        let mut completion = self.inner.completion.lock();
        // 해제 이후에 끝난 설치는 완료 다이얼로그를 띄우지 않음
        if self.inner.disposed.load(Ordering::SeqCst) {
            tracing::debug!("[Updater] Install finished after dispose, skipping completion dialog");
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(COMPLETION_DIALOG_DELAY).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.disposed.load(Ordering::SeqCst) {
                return;
            }
            inner.state.write().restart_pending = true;
            inner.emit(UpdateEvent::InstallCompleted);
        });
        if let Some(previous) = completion.replace(handle) {
            previous.abort();
        }
    }

    /// 설치 완료 모달 확인 → 재시작 요청 (설치 1회당 최대 1번)
    ///
    /// 재시작 실패는 로그만 남깁니다. 프로세스는 어차피 종료될 예정입니다.
    pub async fn acknowledge_install(&self) -> bool {
        let pending = std::mem::take(&mut self.inner.state.write().restart_pending);
        if !pending {
            return false;
        }

        tracing::info!("[Updater] Install acknowledged, restarting app");
        if let Err(e) = self.inner.backend.restart_app().await {
            tracing::warn!("[Updater] Restart request failed ({}): {}", e.kind(), e);
        }
        true
    }

    // ─── 프롬프트 ───────────────────────────────────────────────

    /// 이번 업데이트 건너뛰기. 다운로드 중에는 닫을 수 없으므로 `false`
    pub fn skip_update(&self) -> bool {
        {
            let mut state = self.inner.state.write();
            if state.downloading {
                tracing::warn!("[Updater] Cannot skip while an update is downloading");
                return false;
            }
            state.prompt_visible = false;
            state.update_info = None;
        }
        tracing::info!("[Updater] Update skipped");
        self.inner.emit(UpdateEvent::UpdateSkipped);
        true
    }

    /// 알림 클릭 시 프롬프트 다시 열기. 표시할 업데이트가 없으면 `false`
    pub fn show_prompt(&self) -> bool {
        let mut state = self.inner.state.write();
        if state.update_info.is_none() && !state.downloading {
            return false;
        }
        state.prompt_visible = true;
        true
    }
}

impl std::fmt::Debug for UpdateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateController")
            .field("config", &self.inner.config)
            .field("state", &*self.inner.state.read())
            .finish()
    }
}
