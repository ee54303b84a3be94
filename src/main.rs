use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::{broadcast, Notify};
use tracing_subscriber::EnvFilter;

use showcase_core::commands::{
    updates, window::WINDOW_EVENT, AppEvent, CommandBackend, CommandHub, EventBus, HeadlessWindow,
};
use showcase_core::config::GlobalConfig;
use showcase_core::ipc::IPCServer;
use showcase_core::updater::{state_to_json, NotificationLevel, UpdateController, UpdateEvent};

const CONSOLE_HELP: &str = "commands: check | install | skip | show | ok | status | quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("showcase-core {} starting", updates::get_app_version());

    let cfg = GlobalConfig::load().unwrap_or_else(|e| {
        tracing::warn!("[Config] {:#}, using defaults", e);
        GlobalConfig::default()
    });

    let events = EventBus::default();
    let window = Arc::new(HeadlessWindow::new(events.clone()));
    let hub = CommandHub::from_config(&cfg.release, events.clone(), window);
    let store_forwarder = hub.forward_store_changes();

    // 컨트롤러는 같은 프로세스의 커맨드를 백엔드로 사용
    let backend = Arc::new(CommandBackend::new(hub.clone()));
    let controller = UpdateController::mount(cfg.updater.clone(), backend);

    let ipc_server = IPCServer::new(hub, &cfg.ipc.listen_addr).with_controller(controller.clone());
    let ipc_task = tokio::spawn(async move {
        if let Err(e) = ipc_server.start().await {
            tracing::error!("[IPC] Server error: {}", e);
        }
    });

    let shutdown = Arc::new(Notify::new());
    tokio::spawn(log_update_events(controller.subscribe()));
    tokio::spawn(watch_app_events(events.listen(), shutdown.clone()));

    if controller.shows_manual_trigger() {
        tokio::spawn(run_console(controller.clone(), shutdown.clone()));
        println!("{}", CONSOLE_HELP);
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
        _ = shutdown.notified() => {}
    }

    controller.dispose();
    ipc_task.abort();
    store_forwarder.abort();
    tracing::info!("showcase-core shutting down");
    Ok(())
}

/// 컨트롤러 알림을 로그로 표시
async fn log_update_events(mut rx: broadcast::Receiver<UpdateEvent>) {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!("[Notify] Skipped {} events", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match event.notification() {
            Some(n) if n.level == NotificationLevel::Error => {
                tracing::error!("[Notify] {}: {}", n.title, n.description)
            }
            Some(n) => tracing::info!("[Notify] {}: {}", n.title, n.description),
            None => {}
        }

        match event {
            UpdateEvent::ProgressChanged { percent } => {
                tracing::debug!("[Notify] Progress {:.0}%", percent)
            }
            UpdateEvent::UpdateFound { .. } => println!("type 'install' to update or 'skip' to ignore"),
            UpdateEvent::InstallCompleted => println!("type 'ok' to restart"),
            _ => {}
        }
    }
}

/// 재시작 요청이나 창 닫기가 오면 종료
async fn watch_app_events(mut rx: broadcast::Receiver<AppEvent>, shutdown: Arc<Notify>) {
    loop {
        match rx.recv().await {
            Ok(event) if event.name == updates::RESTART_EVENT => {
                tracing::info!("[Main] Restart requested, exiting so the launcher can start the new version");
                shutdown.notify_one();
            }
            Ok(event) if event.name == WINDOW_EVENT && event.payload["action"] == "close" => {
                shutdown.notify_one();
            }
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn run_console(controller: UpdateController, shutdown: Arc<Notify>) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "" => {}
            "check" => {
                let c = controller.clone();
                tokio::spawn(async move { c.check_for_updates(true).await });
            }
            "install" => {
                let c = controller.clone();
                tokio::spawn(async move { c.download_and_install().await });
            }
            "skip" => {
                if !controller.skip_update() {
                    println!("cannot skip while downloading");
                }
            }
            "show" => {
                if !controller.show_prompt() {
                    println!("no update to show");
                }
            }
            "ok" => {
                let c = controller.clone();
                tokio::spawn(async move {
                    if !c.acknowledge_install().await {
                        println!("no completed install to acknowledge");
                    }
                });
            }
            "status" => println!("{}", state_to_json(&controller.state())),
            "quit" | "exit" => {
                shutdown.notify_one();
                break;
            }
            other => println!("unknown command '{}'. {}", other, CONSOLE_HELP),
        }
    }
}
