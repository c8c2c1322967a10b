//! The generate -> classify -> retain pipeline.
//!
//! [`TelemetryPipeline::generate`] is the single body shared by the
//! periodic scheduler and direct callers. It never isolates failures: the
//! scheduler wraps it in its own isolation boundary, direct callers see the
//! error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use flightwatch_types::Snapshot;
use serde::Serialize;
use tracing::debug;

use crate::classifier::{Classify, EnvelopeClassifier, anomalous_metrics};
use crate::error::TelemetryError;
use crate::generator::{TelemetryGenerator, TelemetrySource};
use crate::injection::InjectionController;

/// Marker reported as the system status before any snapshot exists.
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

/// Single-slot, concurrency-safe holder of the latest classified snapshot.
///
/// Written only by the pipeline; read by status queries.
#[derive(Debug, Default)]
pub struct SnapshotCell {
    slot: RwLock<Option<Snapshot>>,
}

impl SnapshotCell {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Replace the retained snapshot.
    pub fn store(&self, snapshot: Snapshot) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(snapshot);
    }

    /// Clone of the retained snapshot, if any.
    pub fn load(&self) -> Option<Snapshot> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Owns the generator, the classifier and the retained snapshot.
pub struct TelemetryPipeline {
    injection: Arc<InjectionController>,
    source: Mutex<Box<dyn TelemetrySource>>,
    classifier: Box<dyn Classify>,
    current: SnapshotCell,
    generated: AtomicU64,
}

impl TelemetryPipeline {
    /// Pipeline with the production generator and envelope classifier.
    pub fn new(injection: Arc<InjectionController>, generator: TelemetryGenerator) -> Self {
        Self::with_parts(injection, Box::new(generator), Box::new(EnvelopeClassifier))
    }

    /// Pipeline with explicit source and classifier implementations.
    pub fn with_parts(
        injection: Arc<InjectionController>,
        source: Box<dyn TelemetrySource>,
        classifier: Box<dyn Classify>,
    ) -> Self {
        Self {
            injection,
            source: Mutex::new(source),
            classifier,
            current: SnapshotCell::new(),
            generated: AtomicU64::new(0),
        }
    }

    /// Run one generation pass and retain the result.
    ///
    /// Advances injection countdowns, produces a raw snapshot honoring the
    /// still-active injections, classifies it, stores it as current and
    /// returns it.
    ///
    /// # Errors
    ///
    /// Propagates [`TelemetryError`] from the source or classifier. The
    /// retained snapshot is left unchanged on failure.
    pub fn generate(&self) -> Result<Snapshot, TelemetryError> {
        let forced = self.injection.tick();
        let raw = {
            let mut source = self.source.lock().unwrap_or_else(PoisonError::into_inner);
            source.produce(&forced)?
        };
        let snapshot = self.classifier.classify(raw)?;

        let count = self.generated.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        if snapshot.has_any_anomaly() {
            debug!(
                generation = count,
                forced = ?forced,
                raised = ?snapshot.raised(),
                metrics = ?anomalous_metrics(&snapshot).iter().map(|m| m.name()).collect::<Vec<_>>(),
                "Snapshot out of envelope"
            );
        }

        self.current.store(snapshot.clone());
        Ok(snapshot)
    }

    /// Latest classified snapshot, or `None` before the first generation.
    pub fn current(&self) -> Option<Snapshot> {
        self.current.load()
    }

    /// Number of successful generations so far.
    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    /// The injection controller this pipeline consults.
    pub const fn injection(&self) -> &Arc<InjectionController> {
        &self.injection
    }
}

impl std::fmt::Debug for TelemetryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryPipeline")
            .field("injection", &self.injection)
            .field("generated", &self.generated())
            .finish_non_exhaustive()
    }
}

/// Best-effort status derived from the retained snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Live observer sessions.
    pub connected_clients: usize,
    /// True once at least one snapshot has been generated.
    pub data_generation_active: bool,
    /// Timestamp of the latest snapshot.
    pub last_update: Option<DateTime<Utc>>,
    /// `"NORMAL"`, `"WARNING"`, or [`UNKNOWN_STATUS`].
    pub system_status: String,
}

impl StatusReport {
    /// Build a report from the current snapshot and the session count.
    pub fn new(current: Option<&Snapshot>, connected_clients: usize) -> Self {
        Self {
            connected_clients,
            data_generation_active: current.is_some(),
            last_update: current.map(|s| s.timestamp),
            system_status: current.map_or_else(
                || UNKNOWN_STATUS.to_owned(),
                |s| s.status.as_str().to_owned(),
            ),
        }
    }
}
