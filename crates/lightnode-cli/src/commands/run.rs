//! Long-running scheduler loop

use anyhow::Result;
use tracing::info;

use lightnode_core::LightNodeConfig;
use lightnode_sync::LightNodeService;

use super::common::build_scheduler;

/// Run cycles on the configured interval until SIGINT or SIGTERM
pub async fn run(config: &LightNodeConfig) -> Result<()> {
    let scheduler = build_scheduler(config)?;
    let service = LightNodeService::new(scheduler, config.scheduler.cycle_interval());

    info!(
        interval_s = config.scheduler.cycle_interval_seconds,
        threshold = config.scheduler.unchanged_threshold,
        cooldown_s = config.scheduler.cooldown_seconds,
        "starting light node"
    );
    service.run_until(setup_shutdown_handler()).await?;

    let stats = service.statistics();
    info!(
        cycles = stats.cycles_run,
        verified = stats.cycles_verified,
        empty = stats.cycles_empty,
        failed = stats.cycles_failed,
        "light node stopped"
    );
    Ok(())
}

/// Resolve on the first SIGINT or SIGTERM
async fn setup_shutdown_handler() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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
