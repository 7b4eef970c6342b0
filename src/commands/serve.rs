//! Run the module engine.

use iris_core::config::AppConfig;
use iris_core::error::AppError;

use crate::engine;

/// Execute the serve command
pub async fn execute(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting IRIS module engine v{}", env!("CARGO_PKG_VERSION"));

    let engine = engine::build(&config).await?;

    let modules = engine.manager.registry().list().await?;
    let hooks = engine.manager.catalog().list().await?;
    tracing::info!(
        "Module engine ready: {} modules, {} hooks",
        modules.len(),
        hooks.len()
    );

    let worker = engine.worker.map(|w| w.start());

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if let Some(worker) = worker {
        let stats = worker.queue.stats();
        tracing::info!(
            "Queue at shutdown: pending={}, running={}, succeeded={}, failed={}",
            stats.pending,
            stats.running,
            stats.succeeded,
            stats.failed
        );
        worker.shutdown().await;
    }

    tracing::info!("IRIS module engine stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
