//! Flightwatch monitor binary.
//!
//! Wires the telemetry pipeline, the tick scheduler and the observer
//! server together, then runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `flightwatch-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Assemble the pipeline, hub and observer state
//! 4. Bind and spawn the observer server
//! 5. Spawn the tick scheduler
//! 6. On `Ctrl-C`, stop the scheduler, then the server

mod error;
mod monitor;

use std::path::Path;
use std::sync::Arc;

use flightwatch_core::config::LoggingConfig;
use flightwatch_core::{LogFormat, MonitorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::monitor::Monitor;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "flightwatch-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the observer
/// server cannot bind, or the shutdown signal cannot be awaited.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let (config, from_file) = load_config()?;
    init_tracing(&config.logging);

    info!("flightwatch-engine starting");
    info!(
        from_file,
        tick_interval_ms = config.simulation.tick_interval_ms,
        injection_duration_ticks = config.simulation.injection_duration_ticks,
        seeded = config.simulation.seed.is_some(),
        host = config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let monitor = Monitor::from_config(&config);

    let observer =
        flightwatch_observer::spawn_observer(&config.server, Arc::clone(&monitor.state)).await?;
    info!(addr = %observer.local_addr(), "Observer API server started");

    let scheduler = monitor.scheduler(&config).spawn();

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    let stats = Arc::clone(scheduler.stats());
    scheduler.shutdown().await;
    observer.shutdown().await?;

    info!(
        ticks = stats.completed(),
        failed_ticks = stats.failed(),
        observers = monitor.hub.connected_count(),
        "flightwatch-engine shutdown complete"
    );
    Ok(())
}

/// Load the monitor configuration from [`CONFIG_PATH`].
///
/// Returns the config and whether it came from the file.
fn load_config() -> Result<(MonitorConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((MonitorConfig::from_file(config_path)?, true))
    } else {
        let mut config = MonitorConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
