//! axumサーバー起動・シャットダウンハンドリング

use anyhow::Context;
use statusboard_common::config::MonitorConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::shutdown::ShutdownController;

/// 設定のアドレスで待ち受け、OSシグナルを受けるまでサーバーを実行する
pub async fn run(config: MonitorConfig) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    let shutdown = ShutdownController::default();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    serve(listener, config, shutdown).await
}

/// 既存のリスナーでサーバーを実行する
///
/// ポーリングを開始し、`shutdown` が要求されるまでHTTP/WebSocketを処理する。
/// 停止時はライブ接続をすべて閉じ、実行中のチェックは破棄する。
pub async fn serve(
    listener: TcpListener,
    config: MonitorConfig,
    shutdown: ShutdownController,
) -> anyhow::Result<()> {
    let (state, scheduler) = crate::build_monitor(&config)?;
    let hub = state.hub.clone();
    let addr = listener.local_addr()?;

    let poller = scheduler.start(shutdown.clone());
    let app = crate::api::create_app(state);

    info!(
        %addr,
        services = config.services.len(),
        poll_interval_ms = config.poll_interval_ms,
        "Statusboard server listening"
    );

    let graceful = {
        let shutdown = shutdown.clone();
        async move {
            shutdown.wait().await;
            hub.close_all().await;
        }
    };

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .await;

    // サーバーがエラーで止まった場合もポーリングを止める
    shutdown.request_shutdown();
    poller.abort();

    result.context("Server error")?;
    info!("Server shutdown complete");
    Ok(())
}

/// OSシグナルを待ち、受信したらシャットダウンを要求する
async fn shutdown_signal(shutdown: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = shutdown.wait() => {
            info!("Shutdown requested, shutting down...");
        }
    }

    shutdown.request_shutdown();
}
