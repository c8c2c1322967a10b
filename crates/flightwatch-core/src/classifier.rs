//! Anomaly classification against the safety envelope.
//!
//! Classification is a pure function of the raw metrics: every flag and the
//! aggregate status are recomputed from scratch, so classifying an already
//! classified snapshot yields the same result.

use flightwatch_types::{Snapshot, Subsystem, SystemStatus};

use crate::envelope::{Metric, SafetyEnvelope};
use crate::error::TelemetryError;

/// The classification seam used by the telemetry pipeline.
///
/// [`EnvelopeClassifier`] is the production implementation; tests swap in
/// failing doubles to exercise upstream-failure handling.
pub trait Classify: Send + Sync {
    /// Annotate `snapshot` with anomaly flags and aggregate status.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError`] if classification cannot complete. A
    /// failed classification returns no snapshot at all.
    fn classify(&self, snapshot: Snapshot) -> Result<Snapshot, TelemetryError>;
}

/// Classifier backed by the static [`SafetyEnvelope`] table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeClassifier;

impl Classify for EnvelopeClassifier {
    fn classify(&self, mut snapshot: Snapshot) -> Result<Snapshot, TelemetryError> {
        classify(&mut snapshot);
        Ok(snapshot)
    }
}

/// Set every subsystem flag and the aggregate status on `snapshot`.
pub fn classify(snapshot: &mut Snapshot) -> &mut Snapshot {
    for subsystem in Subsystem::ALL {
        let raised = !SafetyEnvelope::within(subsystem, snapshot);
        snapshot.set_flag(subsystem, raised);
    }
    snapshot.status = if snapshot.has_any_anomaly() {
        SystemStatus::Warning
    } else {
        SystemStatus::Normal
    };
    snapshot
}

/// Classify a snapshot that may be absent.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidInput`] when `snapshot` is `None`.
pub fn classify_checked(snapshot: Option<Snapshot>) -> Result<Snapshot, TelemetryError> {
    let mut snapshot = snapshot
        .ok_or_else(|| TelemetryError::InvalidInput("snapshot is required".to_owned()))?;
    classify(&mut snapshot);
    Ok(snapshot)
}

/// Metrics of `snapshot` that lie outside their envelope.
pub fn anomalous_metrics(snapshot: &Snapshot) -> Vec<Metric> {
    Subsystem::ALL
        .into_iter()
        .flat_map(|sub| SafetyEnvelope::metrics(sub).iter().copied())
        .filter(|metric| !SafetyEnvelope::bound(*metric).contains(metric.read(snapshot)))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    /// The cruise reading every scenario starts from.
    fn nominal() -> Snapshot {
        let mut s = Snapshot::at(Utc::now());
        s.engine_rpm = 2200.0;
        s.engine_temperature = 150.0;
        s.oil_pressure = 45.0;
        s.oil_temperature = 90.0;
        s.fuel_level = 75.0;
        s.fuel_consumption = 250.0;
        s.fuel_pressure = 25.0;
        s.fuel_temperature = 20.0;
        s.hydraulic_pressure = 2800.0;
        s.hydraulic_temperature = 55.0;
        s.hydraulic_fluid_level = 95.0;
        s.altitude = 35_000.0;
        s.airspeed = 450.0;
        s.ground_speed = 440.0;
        s.mach_number = 0.7;
        s.vertical_speed = -200.0;
        s
    }

    fn classified(mut s: Snapshot) -> Snapshot {
        classify(&mut s);
        s
    }

    #[test]
    fn nominal_reading_is_normal() {
        let s = classified(nominal());
        assert!(!s.has_any_anomaly());
        assert_eq!(s.status, SystemStatus::Normal);
    }

    #[test]
    fn rpm_boundary_scenario() {
        let mut s = nominal();
        s.engine_rpm = 499.9;
        let s = classified(s);
        assert!(s.engine_anomaly);
        assert_eq!(s.status, SystemStatus::Warning);

        let mut s = nominal();
        s.engine_rpm = 500.0;
        let s = classified(s);
        assert!(!s.engine_anomaly);
        assert_eq!(s.status, SystemStatus::Normal);
    }

    #[test]
    fn mach_boundary_scenario() {
        let mut s = nominal();
        s.mach_number = 0.9;
        assert!(!classified(s).airspeed_anomaly);

        let mut s = nominal();
        s.mach_number = 0.91;
        assert!(classified(s).airspeed_anomaly);
    }

    #[test]
    fn every_metric_at_its_bound_is_normal() {
        for sub in Subsystem::ALL {
            for metric in SafetyEnvelope::metrics(sub) {
                let bound = SafetyEnvelope::bound(*metric);
                for edge in [bound.min, bound.max].into_iter().flatten() {
                    let mut s = nominal();
                    set(&mut s, *metric, edge);
                    let s = classified(s);
                    assert!(!s.flag(sub), "{} at {edge} flagged", metric.name());
                }
            }
        }
    }

    #[test]
    fn non_finite_metric_flags_its_subsystem() {
        for sub in Subsystem::ALL {
            for metric in SafetyEnvelope::metrics(sub) {
                for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                    let mut s = nominal();
                    set(&mut s, *metric, bad);
                    let s = classified(s);
                    assert!(s.flag(sub), "{} = {bad} not flagged", metric.name());
                    assert_eq!(s.status, SystemStatus::Warning);
                }
            }
        }
    }

    #[test]
    fn all_out_of_envelope_raises_all_flags() {
        let mut s = nominal();
        s.engine_rpm = 4000.0;
        s.fuel_level = 15.0;
        s.hydraulic_pressure = 1800.0;
        s.altitude = 50_000.0;
        s.airspeed = 700.0;
        let s = classified(s);
        assert_eq!(s.raised(), Subsystem::ALL.to_vec());
    }

    #[test]
    fn classification_is_idempotent_and_clears_stale_flags() {
        let mut s = nominal();
        s.fuel_pressure = 60.0;
        let once = classified(s);
        let twice = classified(once.clone());
        assert_eq!(once, twice);

        // A stale flag on a clean reading is cleared, not accumulated.
        let mut stale = nominal();
        stale.hydraulic_anomaly = true;
        stale.status = SystemStatus::Warning;
        let cleaned = classified(stale);
        assert!(!cleaned.hydraulic_anomaly);
        assert_eq!(cleaned.status, SystemStatus::Normal);
    }

    #[test]
    fn status_tracks_has_any_anomaly() {
        for sub in Subsystem::ALL {
            let mut s = nominal();
            set(&mut s, SafetyEnvelope::metrics(sub)[0], f64::NAN);
            let s = classified(s);
            assert_eq!(s.has_any_anomaly(), s.status == SystemStatus::Warning);
        }
    }

    #[test]
    fn absent_snapshot_is_invalid_input() {
        assert!(matches!(
            classify_checked(None),
            Err(TelemetryError::InvalidInput(_))
        ));
        assert!(classify_checked(Some(nominal())).is_ok());
    }

    #[test]
    fn anomalous_metrics_lists_offenders() {
        let mut s = nominal();
        s.oil_temperature = 130.0;
        s.vertical_speed = 6000.0;
        assert_eq!(
            anomalous_metrics(&s),
            vec![Metric::OilTemperature, Metric::VerticalSpeed]
        );
    }

    #[test]
    fn trait_impl_matches_free_function() {
        let mut s = nominal();
        s.hydraulic_fluid_level = 70.0;
        let via_trait = EnvelopeClassifier.classify(s.clone());
        assert_eq!(via_trait, Ok(classified(s)));
    }

    fn set(s: &mut Snapshot, metric: Metric, value: f64) {
        match metric {
            Metric::EngineRpm => s.engine_rpm = value,
            Metric::EngineTemperature => s.engine_temperature = value,
            Metric::OilPressure => s.oil_pressure = value,
            Metric::OilTemperature => s.oil_temperature = value,
            Metric::FuelLevel => s.fuel_level = value,
            Metric::FuelConsumption => s.fuel_consumption = value,
            Metric::FuelPressure => s.fuel_pressure = value,
            Metric::HydraulicPressure => s.hydraulic_pressure = value,
            Metric::HydraulicTemperature => s.hydraulic_temperature = value,
            Metric::HydraulicFluidLevel => s.hydraulic_fluid_level = value,
            Metric::Altitude => s.altitude = value,
            Metric::VerticalSpeed => s.vertical_speed = value,
            Metric::Airspeed => s.airspeed = value,
            Metric::MachNumber => s.mach_number = value,
        }
    }
}
