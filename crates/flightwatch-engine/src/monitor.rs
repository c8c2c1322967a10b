//! Component assembly.
//!
//! [`Monitor`] builds the shared pieces from a [`MonitorConfig`] and hands
//! out the scheduler and observer state that wire them together. The
//! broadcast hub is both the scheduler's sink and the observer's registry.

use std::sync::Arc;

use flightwatch_core::{
    InjectionController, MonitorConfig, Scheduler, SnapshotSink, TelemetryGenerator,
    TelemetryPipeline,
};
use flightwatch_observer::{AppState, BroadcastHub, TransportConfig};

/// The assembled monitor components.
#[derive(Debug)]
pub struct Monitor {
    /// Observer registry and snapshot sink.
    pub hub: Arc<BroadcastHub>,
    /// Generate -> classify -> retain pipeline.
    pub pipeline: Arc<TelemetryPipeline>,
    /// State served by the observer router.
    pub state: Arc<AppState>,
}

impl Monitor {
    /// Build every component from configuration.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let injection = Arc::new(InjectionController::new(
            config.simulation.injection_duration_ticks,
        ));
        let pipeline = Arc::new(TelemetryPipeline::new(
            injection,
            TelemetryGenerator::from_seed(config.simulation.seed),
        ));
        let hub = Arc::new(BroadcastHub::new());
        let state = Arc::new(AppState::new(
            Arc::clone(&hub),
            Arc::clone(&pipeline),
            TransportConfig::from(&config.server),
        ));
        Self {
            hub,
            pipeline,
            state,
        }
    }

    /// A scheduler that publishes every tick into the hub.
    pub fn scheduler(&self, config: &MonitorConfig) -> Scheduler {
        Scheduler::new(
            Arc::clone(&self.pipeline),
            Arc::clone(&self.hub) as Arc<dyn SnapshotSink>,
            config.simulation.tick_interval(),
        )
    }
}
