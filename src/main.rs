use std::sync::Arc;

use mhconfig_client::ClientBuilder;
use mhconfig_client::Error;
use mhconfig_client::LogConfig;
use mhconfig_client::Result;
use mhconfig_client::Settings;
use mhconfig_client::WatchEvent;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1);
    let settings = Settings::load(config_path.as_deref())?;

    // Initializing Logs
    let _guard = init_observability(&settings.log)?;

    let client = ClientBuilder::from_settings(&settings).build_lazy()?;
    if settings.watches.is_empty() {
        warn!("No watch targets configured, nothing to do");
    }

    for target in &settings.watches {
        let namespace = target.namespace_key();
        let key = target.config_key();
        let label = format!("{namespace} {key}");

        let callback = Arc::new(move |event: &WatchEvent| match &event.config {
            Some(config) if event.status.is_ok() => {
                info!(target = %label, version = ?event.version, "{}", config.value());
            }
            _ => warn!(target = %label, status = %event.status, "no value"),
        });
        let (subscription_id, _) = client.watch(&namespace, &key, Some(callback))?;
        info!(subscription_id, %namespace, %key, "watching");
    }

    info!("Application started. Waiting for CTRL+C signal...");
    if let Err(e) = wait_for_shutdown().await {
        error!("Failed to listen for shutdown signals: {:?}", e);
    }

    client.close().await?;
    info!("Shutdown completed");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(|e| Error::Fatal(e.to_string()))?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(|e| Error::Fatal(e.to_string()))?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
    }
    Ok(())
}

/// Logs go to a daily rolling file under `log.dir` when set, stdout otherwise
fn init_observability(log: &LogConfig) -> Result<WorkerGuard> {
    let (non_blocking, guard) = match &log.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| Error::Fatal(format!("create log dir {dir:?}: {e}")))?;
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, &log.file_name))
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();

    Ok(guard)
}
