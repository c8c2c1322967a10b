//! Periodic tick driver.
//!
//! The scheduler owns one background Tokio task that fires a tick every
//! period. Each tick runs [`TelemetryPipeline::generate`] and hands the
//! result to a [`SnapshotSink`]. A failed tick is logged and counted; the
//! next period runs as usual.
//!
//! Missed periods (a tick that overran) are delayed rather than burst, so a
//! slow broadcast pass never causes a catch-up storm.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use flightwatch_types::Snapshot;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::pipeline::TelemetryPipeline;

/// Receives each tick's classified snapshot.
///
/// Implemented by the broadcast hub. Implementations must not block: the
/// call runs on the scheduler task.
pub trait SnapshotSink: Send + Sync {
    /// Deliver one snapshot to every interested party.
    fn publish(&self, snapshot: &Snapshot);
}

/// Tick counters shared between the scheduler task and its handle.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    completed: AtomicU64,
    failed: AtomicU64,
}

impl SchedulerStats {
    /// Ticks that produced and published a snapshot.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Ticks whose pipeline run failed.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Fixed-period driver for the telemetry pipeline.
pub struct Scheduler {
    pipeline: Arc<TelemetryPipeline>,
    sink: Arc<dyn SnapshotSink>,
    period: Duration,
    stats: Arc<SchedulerStats>,
}

impl Scheduler {
    /// Create a scheduler firing every `period`.
    ///
    /// A zero period is raised to one millisecond.
    pub fn new(
        pipeline: Arc<TelemetryPipeline>,
        sink: Arc<dyn SnapshotSink>,
        period: Duration,
    ) -> Self {
        Self {
            pipeline,
            sink,
            period: period.max(Duration::from_millis(1)),
            stats: Arc::new(SchedulerStats::default()),
        }
    }

    /// Shared tick counters.
    pub fn stats(&self) -> Arc<SchedulerStats> {
        Arc::clone(&self.stats)
    }

    /// Run one isolated tick.
    ///
    /// Returns `true` if a snapshot was produced and published. Failures
    /// are logged and swallowed.
    pub fn tick_once(&self) -> bool {
        match self.pipeline.generate() {
            Ok(snapshot) => {
                self.sink.publish(&snapshot);
                let tick = self.stats.completed.fetch_add(1, Ordering::Relaxed);
                debug!(tick = tick.saturating_add(1), status = %snapshot.status, "Tick complete");
                true
            }
            Err(e) => {
                let failed = self.stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, failed_ticks = failed.saturating_add(1), "Tick failed, continuing");
                false
            }
        }
    }

    /// Start the periodic loop on a background task.
    pub fn spawn(self) -> SchedulerHandle {
        let shutdown = Arc::new(Notify::new());
        let stats = Arc::clone(&self.stats);
        let stop = Arc::clone(&shutdown);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX);
            info!(period_ms, "Telemetry scheduler started");

            loop {
                tokio::select! {
                    () = stop.notified() => break,
                    _ = interval.tick() => {
                        self.tick_once();
                    }
                }
            }

            info!(
                completed = self.stats.completed(),
                failed = self.stats.failed(),
                "Telemetry scheduler stopped"
            );
        });

        SchedulerHandle {
            shutdown,
            stats,
            task,
        }
    }
}

/// Handle to a running scheduler task.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: Arc<Notify>,
    stats: Arc<SchedulerStats>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Shared tick counters.
    pub const fn stats(&self) -> &Arc<SchedulerStats> {
        &self.stats
    }

    /// Stop the loop after the in-flight tick, and wait for the task.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Telemetry scheduler task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use flightwatch_types::Subsystem;

    use super::*;
    use crate::classifier::EnvelopeClassifier;
    use crate::error::TelemetryError;
    use crate::generator::{TelemetryGenerator, TelemetrySource};
    use crate::injection::InjectionController;

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<Snapshot>>,
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.seen.lock().map(|v| v.len()).unwrap_or(0)
        }
    }

    impl SnapshotSink for RecordingSink {
        fn publish(&self, snapshot: &Snapshot) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(snapshot.clone());
            }
        }
    }

    /// Fails every other call.
    struct FlakySource {
        inner: TelemetryGenerator,
        calls: u32,
    }

    impl TelemetrySource for FlakySource {
        fn produce(&mut self, forced: &BTreeSet<Subsystem>) -> Result<Snapshot, TelemetryError> {
            self.calls = self.calls.saturating_add(1);
            if self.calls % 2 == 0 {
                return Err(TelemetryError::Upstream {
                    stage: "generate",
                    message: "intermittent".to_owned(),
                });
            }
            self.inner.produce(forced)
        }
    }

    fn flaky_pipeline() -> Arc<TelemetryPipeline> {
        Arc::new(TelemetryPipeline::with_parts(
            Arc::new(InjectionController::default()),
            Box::new(FlakySource {
                inner: TelemetryGenerator::seeded(2),
                calls: 0,
            }),
            Box::new(EnvelopeClassifier),
        ))
    }

    #[test]
    fn tick_once_publishes_current_snapshot() {
        let pipeline = Arc::new(TelemetryPipeline::new(
            Arc::new(InjectionController::default()),
            TelemetryGenerator::seeded(4),
        ));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = Scheduler::new(
            Arc::clone(&pipeline),
            Arc::clone(&sink) as Arc<dyn SnapshotSink>,
            Duration::from_secs(2),
        );

        assert!(scheduler.tick_once());
        assert_eq!(sink.count(), 1);
        let published = sink.seen.lock().ok().and_then(|v| v.first().cloned());
        assert_eq!(published, pipeline.current());
    }

    #[test]
    fn failed_tick_is_isolated() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = Scheduler::new(
            flaky_pipeline(),
            Arc::clone(&sink) as Arc<dyn SnapshotSink>,
            Duration::from_secs(2),
        );

        assert!(scheduler.tick_once());
        assert!(!scheduler.tick_once());
        assert!(scheduler.tick_once());
        assert_eq!(sink.count(), 2);
        assert_eq!(scheduler.stats().completed(), 2);
        assert_eq!(scheduler.stats().failed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_loop_survives_failures_and_stops() {
        let sink = Arc::new(RecordingSink::default());
        let handle = Scheduler::new(
            flaky_pipeline(),
            Arc::clone(&sink) as Arc<dyn SnapshotSink>,
            Duration::from_secs(2),
        )
        .spawn();

        tokio::time::sleep(Duration::from_millis(8_500)).await;
        let stats = Arc::clone(handle.stats());
        handle.shutdown().await;

        assert!(stats.completed() >= 2);
        assert!(stats.failed() >= 2);
        assert_eq!(u64::try_from(sink.count()).unwrap_or(0), stats.completed());
    }
}
