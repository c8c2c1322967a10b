//! Shared application state for the observer server.
//!
//! [`AppState`] is wrapped in an [`Arc`] and injected into every handler
//! via Axum's `State` extractor. It only holds handles: the pipeline owns
//! the retained snapshot and injection countdowns, the hub owns the
//! session registry.

use std::sync::Arc;
use std::time::Duration;

use flightwatch_core::{InjectionController, ServerSettings, TelemetryPipeline};

use crate::hub::BroadcastHub;

/// Per-session transport limits for `WebSocket` observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound on a single socket write.
    pub send_timeout: Duration,
    /// Frames queued per session before sends fail with backpressure.
    pub session_buffer: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::from(&ServerSettings::default())
    }
}

impl From<&ServerSettings> for TransportConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            send_timeout: settings.send_timeout(),
            session_buffer: settings.session_buffer.max(1),
        }
    }
}

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Observer registry and broadcaster.
    pub hub: Arc<BroadcastHub>,
    /// The telemetry pipeline (latest snapshot, injection control).
    pub pipeline: Arc<TelemetryPipeline>,
    /// Transport limits applied to new `WebSocket` sessions.
    pub transport: TransportConfig,
}

impl AppState {
    /// Bundle the shared components.
    pub const fn new(
        hub: Arc<BroadcastHub>,
        pipeline: Arc<TelemetryPipeline>,
        transport: TransportConfig,
    ) -> Self {
        Self {
            hub,
            pipeline,
            transport,
        }
    }

    /// The injection controller behind the pipeline.
    pub fn injection(&self) -> &Arc<InjectionController> {
        self.pipeline.injection()
    }
}
