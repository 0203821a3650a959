//! volnoted - persistent media-volume status notification daemon.
//!
//! Keeps a silent, non-dismissable desktop notification showing the current
//! media volume as a rendered percentage icon, refreshing it whenever the
//! system volume changes. Intended to be started at session login and left
//! running for the life of the session.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use volnote_core::{bootstrap, BootstrappedService};

use crate::config::DaemonConfig;

/// volnoted - media volume status display.
#[derive(Parser, Debug)]
#[command(name = "volnoted")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "VOLNOTE_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Mixer backend: auto, wpctl or alsa (overrides config file).
    #[arg(short, long, env = "VOLNOTE_BACKEND")]
    backend: Option<String>,

    /// Icon edge length in pixels (overrides config file).
    #[arg(long, env = "VOLNOTE_ICON_EDGE")]
    icon_edge: Option<u32>,

    /// Watcher poll interval in milliseconds (overrides config file).
    #[arg(long, env = "VOLNOTE_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("volnoted v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        DaemonConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(edge) = args.icon_edge {
        config.icon_edge = edge;
    }
    if let Some(interval) = args.poll_interval_ms {
        config.poll_interval_ms = interval;
    }

    let core_config = config.to_core_config().context("Invalid configuration")?;
    log::info!(
        "Configuration: backend={}, icon_edge={}, poll_interval_ms={}",
        config.backend,
        config.icon_edge,
        config.poll_interval_ms
    );

    let BootstrappedService {
        service,
        events,
        subscription,
    } = bootstrap(&core_config)
        .await
        .context("Failed to bootstrap the volume status service")?;

    let loop_handle = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.run(events).await }
    });

    log::info!("Volume status display active");

    // Wait for shutdown signal
    shutdown_signal().await;

    log::info!("Shutdown signal received, cleaning up...");

    // Dropping the subscription cancels the watcher; the event channel
    // closes and the service loop drains out on its own.
    drop(subscription);
    if tokio::time::timeout(Duration::from_secs(2), loop_handle)
        .await
        .is_err()
    {
        log::warn!("service loop did not stop in time, abandoning it");
    }

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
