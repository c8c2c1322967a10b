//! Operator-requested anomaly injection.
//!
//! Each subsystem runs a small state machine:
//!
//! ```text
//! Idle --request--> Active(N) --tick--> Active(N-1) ... Active(1) --tick--> Idle
//! ```
//!
//! A request while already active resets the countdown to `N`; requests
//! never stack. The controller is shared between operator handlers
//! (`request`) and the scheduler (`tick`) behind one mutex, so a request
//! racing a tick lands either before or after that tick, never half-way.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use flightwatch_types::Subsystem;
use tracing::{debug, info};

/// Default injection window in ticks.
pub const DEFAULT_INJECTION_TICKS: u32 = 10;

/// Per-subsystem injection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionState {
    /// Generating from the cruise range.
    Idle,
    /// Forced out of envelope for this many more ticks, counting the
    /// tick that decrements to zero.
    Active {
        /// Ticks remaining before the subsystem returns to idle.
        remaining: u32,
    },
}

/// Shared injection countdowns for all subsystems.
#[derive(Debug)]
pub struct InjectionController {
    /// Full window length applied by every request.
    duration: u32,
    /// Only active subsystems are present; absence means idle.
    active: Mutex<BTreeMap<Subsystem, u32>>,
}

impl InjectionController {
    /// Create a controller whose requests last `duration_ticks` ticks.
    ///
    /// A zero duration is raised to one so a request is never a no-op.
    pub fn new(duration_ticks: u32) -> Self {
        Self {
            duration: duration_ticks.max(1),
            active: Mutex::new(BTreeMap::new()),
        }
    }

    /// The window length applied by [`request`](Self::request).
    pub const fn duration_ticks(&self) -> u32 {
        self.duration
    }

    /// Start (or restart) forcing `subsystem` out of envelope.
    pub fn request(&self, subsystem: Subsystem) {
        let previous = self.lock().insert(subsystem, self.duration);
        info!(
            subsystem = %subsystem,
            duration_ticks = self.duration,
            restarted = previous.is_some(),
            "Anomaly injection requested"
        );
    }

    /// Advance every countdown by one tick.
    ///
    /// Returns the subsystems that remain active after the decrement, i.e.
    /// the ones the generator must force on this tick.
    pub fn tick(&self) -> BTreeSet<Subsystem> {
        let mut active = self.lock();
        active.retain(|subsystem, remaining| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                debug!(subsystem = %subsystem, "Anomaly injection expired");
                false
            } else {
                true
            }
        });
        active.keys().copied().collect()
    }

    /// Whether `subsystem` is currently forced.
    pub fn is_active(&self, subsystem: Subsystem) -> bool {
        self.lock().contains_key(&subsystem)
    }

    /// Current state of one subsystem.
    pub fn state(&self, subsystem: Subsystem) -> InjectionState {
        self.lock()
            .get(&subsystem)
            .map_or(InjectionState::Idle, |remaining| InjectionState::Active {
                remaining: *remaining,
            })
    }

    /// Currently forced subsystems, without advancing.
    pub fn active(&self) -> BTreeSet<Subsystem> {
        self.lock().keys().copied().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Subsystem, u32>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InjectionController {
    fn default() -> Self {
        Self::new(DEFAULT_INJECTION_TICKS)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn starts_idle() {
        let ctl = InjectionController::default();
        for sub in Subsystem::ALL {
            assert!(!ctl.is_active(sub));
            assert_eq!(ctl.state(sub), InjectionState::Idle);
        }
        assert!(ctl.tick().is_empty());
    }

    #[test]
    fn countdown_expires_on_nth_tick() {
        let ctl = InjectionController::new(10);
        ctl.request(Subsystem::Engine);
        assert_eq!(
            ctl.state(Subsystem::Engine),
            InjectionState::Active { remaining: 10 }
        );

        for tick in 1..10 {
            let active = ctl.tick();
            assert!(active.contains(&Subsystem::Engine), "tick {tick}");
        }
        assert!(ctl.tick().is_empty());
        assert_eq!(ctl.state(Subsystem::Engine), InjectionState::Idle);
    }

    #[test]
    fn repeated_request_resets_without_stacking() {
        let ctl = InjectionController::new(3);
        ctl.request(Subsystem::Fuel);
        let _ = ctl.tick();
        let _ = ctl.tick();
        ctl.request(Subsystem::Fuel);
        ctl.request(Subsystem::Fuel);
        assert_eq!(
            ctl.state(Subsystem::Fuel),
            InjectionState::Active { remaining: 3 }
        );
        assert!(ctl.tick().contains(&Subsystem::Fuel));
        assert!(ctl.tick().contains(&Subsystem::Fuel));
        assert!(ctl.tick().is_empty());
    }

    #[test]
    fn subsystems_count_down_independently() {
        let ctl = InjectionController::new(2);
        ctl.request(Subsystem::Hydraulic);
        let _ = ctl.tick();
        ctl.request(Subsystem::Airspeed);
        let active = ctl.tick();
        assert!(!active.contains(&Subsystem::Hydraulic));
        assert!(active.contains(&Subsystem::Airspeed));
        assert_eq!(ctl.active(), active);
    }

    #[test]
    fn zero_duration_is_raised_to_one() {
        let ctl = InjectionController::new(0);
        assert_eq!(ctl.duration_ticks(), 1);
        ctl.request(Subsystem::Altitude);
        assert!(ctl.is_active(Subsystem::Altitude));
        assert!(ctl.tick().is_empty());
    }

    #[test]
    fn concurrent_requests_and_ticks_stay_consistent() {
        let ctl = Arc::new(InjectionController::new(5));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ctl = Arc::clone(&ctl);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if i % 2 == 0 {
                            ctl.request(Subsystem::Engine);
                        } else {
                            let _ = ctl.tick();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().is_ok());
        }
        match ctl.state(Subsystem::Engine) {
            InjectionState::Idle => {}
            InjectionState::Active { remaining } => assert!((1..=5).contains(&remaining)),
        }
    }
}
