use tracing::warn;

/// 等待 Ctrl+C；Unix 下同时监听 SIGTERM
pub async fn listen_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => warn!("Ctrl+C received, shutting down"),
                    _ = terminate.recv() => warn!("SIGTERM received, shutting down"),
                }
                return;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Ctrl+C received, shutting down");
}
