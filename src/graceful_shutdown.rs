//! Graceful shutdown

use tokio::signal;

/// Resolves once the process is asked to stop
///
/// Listens for Ctrl+C and, on unix, for SIGTERM (what a container runtime
/// sends); handing this future to `axum::serve` lets in-flight admin
/// requests finish before the listener closes
pub async fn handler() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Ctrl+C handler to install");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler to install")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
