//! Telemetry core for the Flightwatch aircraft monitor.
//!
//! This crate owns everything with real state in the monitor except the
//! observer registry:
//!
//! - [`envelope`] -- static per-metric safety bounds
//! - [`classifier`] -- pure snapshot classification against the envelope
//! - [`injection`] -- operator-requested out-of-envelope forcing
//! - [`generator`] -- synthetic cruise telemetry
//! - [`pipeline`] -- generate -> classify -> retain, plus status derivation
//! - [`scheduler`] -- the periodic tick driver
//! - [`config`] -- typed YAML configuration
//!
//! # Tick flow
//!
//! ```text
//! Scheduler --> InjectionController::tick --> TelemetrySource::produce
//!           --> Classify::classify --> SnapshotCell::store --> SnapshotSink::publish
//! ```
//!
//! Nothing here knows about sockets. The broadcast hub implements
//! [`scheduler::SnapshotSink`] from the observer crate.

pub mod classifier;
pub mod config;
pub mod envelope;
pub mod error;
pub mod generator;
pub mod injection;
pub mod pipeline;
pub mod scheduler;

pub use classifier::{Classify, EnvelopeClassifier, classify, classify_checked};
pub use config::{ConfigError, LogFormat, MonitorConfig, ServerSettings};
pub use envelope::{Bound, Metric, SafetyEnvelope};
pub use error::TelemetryError;
pub use generator::{TelemetryGenerator, TelemetrySource};
pub use injection::{InjectionController, InjectionState};
pub use pipeline::{SnapshotCell, StatusReport, TelemetryPipeline};
pub use scheduler::{Scheduler, SchedulerHandle, SnapshotSink};
