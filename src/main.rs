use anyhow::Result;
use tracing_subscriber::fmt::time::FormatTime;
use validator_watch::*;

struct UtcTimer;

impl FormatTime for UtcTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_timer(UtcTimer)
        .with_env_filter(logging::env_filter())
        .init();

    let app_config = config::AppConfig::load()?;
    let schedule = worker::Schedule::from_config(&app_config.schedule)?;

    let source = validator_repo::LcdValidatorRepo::new(&app_config.validator);
    let notifier = notifier::TelegramNotifier::new(&app_config.telegram);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        url = source.url(),
        channel_id = %app_config.telegram.channel_id,
        interval_secs = app_config.schedule.interval_secs,
        cron = ?app_config.schedule.cron,
        "Starting validator token watch"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let mut worker_handle = worker::spawn(
        worker::Monitor::new(source, notifier),
        worker::WorkerConfig {
            schedule,
            run_on_start: app_config.schedule.run_on_start,
        },
        shutdown_rx,
    );

    tokio::select! {
        result = &mut worker_handle => {
            result?;
            tracing::info!("Worker finished");
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }

    Ok(())
}
