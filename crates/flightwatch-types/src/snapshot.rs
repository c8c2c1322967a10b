//! The timestamped telemetry record pushed to every observer.
//!
//! A [`Snapshot`] is created raw by the generator, annotated in place by
//! the classifier, then serialized flat onto the wire. Field names on the
//! wire follow the dashboard's camelCase schema (`engineRPM`, `fuelLevel`,
//! ...), so every field carries an explicit rename where the default
//! camelCase conversion would differ.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Subsystem, SystemStatus};

/// One point-in-time, fully populated telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Wall-clock time the reading was generated.
    pub timestamp: DateTime<Utc>,

    // --- Engine ---
    /// Engine revolutions per minute.
    #[serde(rename = "engineRPM")]
    pub engine_rpm: f64,
    /// Engine temperature in degrees Celsius.
    pub engine_temperature: f64,
    /// Oil pressure in PSI.
    pub oil_pressure: f64,
    /// Oil temperature in degrees Celsius.
    pub oil_temperature: f64,

    // --- Fuel ---
    /// Fuel remaining as a percentage of capacity.
    pub fuel_level: f64,
    /// Fuel flow in pounds per hour.
    pub fuel_consumption: f64,
    /// Fuel line pressure in PSI.
    pub fuel_pressure: f64,
    /// Fuel temperature in degrees Celsius.
    pub fuel_temperature: f64,

    // --- Hydraulic ---
    /// Hydraulic system pressure in PSI.
    pub hydraulic_pressure: f64,
    /// Hydraulic fluid temperature in degrees Celsius.
    pub hydraulic_temperature: f64,
    /// Hydraulic reservoir level as a percentage.
    pub hydraulic_fluid_level: f64,

    // --- Flight ---
    /// Pressure altitude in feet.
    pub altitude: f64,
    /// Indicated airspeed in knots.
    pub airspeed: f64,
    /// Ground speed in knots.
    pub ground_speed: f64,
    /// Mach number.
    pub mach_number: f64,
    /// Vertical speed in feet per minute.
    pub vertical_speed: f64,

    // --- Cabin ---
    /// Cabin pressure in PSI.
    pub cabin_pressure: f64,
    /// Cabin temperature in degrees Celsius.
    pub cabin_temperature: f64,

    // --- Electrical ---
    /// Battery bus voltage.
    pub battery_voltage: f64,
    /// Generator output voltage.
    pub generator_output: f64,

    // --- Classification ---
    /// Engine metrics outside their envelope.
    pub engine_anomaly: bool,
    /// Fuel metrics outside their envelope.
    pub fuel_anomaly: bool,
    /// Hydraulic metrics outside their envelope.
    pub hydraulic_anomaly: bool,
    /// Altitude or vertical speed outside their envelope.
    pub altitude_anomaly: bool,
    /// Airspeed or Mach outside their envelope.
    pub airspeed_anomaly: bool,
    /// Aggregate status derived from the five flags.
    pub status: SystemStatus,
}

impl Snapshot {
    /// Create an all-zero, unclassified snapshot stamped with `timestamp`.
    pub const fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            engine_rpm: 0.0,
            engine_temperature: 0.0,
            oil_pressure: 0.0,
            oil_temperature: 0.0,
            fuel_level: 0.0,
            fuel_consumption: 0.0,
            fuel_pressure: 0.0,
            fuel_temperature: 0.0,
            hydraulic_pressure: 0.0,
            hydraulic_temperature: 0.0,
            hydraulic_fluid_level: 0.0,
            altitude: 0.0,
            airspeed: 0.0,
            ground_speed: 0.0,
            mach_number: 0.0,
            vertical_speed: 0.0,
            cabin_pressure: 0.0,
            cabin_temperature: 0.0,
            battery_voltage: 0.0,
            generator_output: 0.0,
            engine_anomaly: false,
            fuel_anomaly: false,
            hydraulic_anomaly: false,
            altitude_anomaly: false,
            airspeed_anomaly: false,
            status: SystemStatus::Normal,
        }
    }

    /// Read the anomaly flag for one subsystem.
    pub const fn flag(&self, subsystem: Subsystem) -> bool {
        match subsystem {
            Subsystem::Engine => self.engine_anomaly,
            Subsystem::Fuel => self.fuel_anomaly,
            Subsystem::Hydraulic => self.hydraulic_anomaly,
            Subsystem::Altitude => self.altitude_anomaly,
            Subsystem::Airspeed => self.airspeed_anomaly,
        }
    }

    /// Set the anomaly flag for one subsystem.
    ///
    /// Does not touch [`Snapshot::status`]; callers that set flags
    /// individually must recompute the aggregate.
    pub const fn set_flag(&mut self, subsystem: Subsystem, raised: bool) {
        match subsystem {
            Subsystem::Engine => self.engine_anomaly = raised,
            Subsystem::Fuel => self.fuel_anomaly = raised,
            Subsystem::Hydraulic => self.hydraulic_anomaly = raised,
            Subsystem::Altitude => self.altitude_anomaly = raised,
            Subsystem::Airspeed => self.airspeed_anomaly = raised,
        }
    }

    /// OR of the five subsystem flags.
    pub const fn has_any_anomaly(&self) -> bool {
        self.engine_anomaly
            || self.fuel_anomaly
            || self.hydraulic_anomaly
            || self.altitude_anomaly
            || self.airspeed_anomaly
    }

    /// Subsystems whose flag is currently raised.
    pub fn raised(&self) -> Vec<Subsystem> {
        Subsystem::ALL
            .into_iter()
            .filter(|sub| self.flag(*sub))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_dashboard_schema() {
        let snap = Snapshot::at(Utc::now());
        let value = serde_json::to_value(&snap).unwrap_or_default();
        for key in [
            "timestamp",
            "engineRPM",
            "engineTemperature",
            "oilPressure",
            "oilTemperature",
            "fuelLevel",
            "fuelConsumption",
            "fuelPressure",
            "fuelTemperature",
            "hydraulicPressure",
            "hydraulicTemperature",
            "hydraulicFluidLevel",
            "altitude",
            "airspeed",
            "groundSpeed",
            "machNumber",
            "verticalSpeed",
            "cabinPressure",
            "cabinTemperature",
            "batteryVoltage",
            "generatorOutput",
            "engineAnomaly",
            "fuelAnomaly",
            "hydraulicAnomaly",
            "altitudeAnomaly",
            "airspeedAnomaly",
            "status",
        ] {
            assert!(value.get(key).is_some(), "missing wire field {key}");
        }
    }

    #[test]
    fn has_any_anomaly_is_or_of_flags() {
        let mut snap = Snapshot::at(Utc::now());
        assert!(!snap.has_any_anomaly());
        for sub in Subsystem::ALL {
            snap.set_flag(sub, true);
            assert!(snap.has_any_anomaly());
            assert_eq!(snap.raised(), vec![sub]);
            snap.set_flag(sub, false);
        }
        assert!(!snap.has_any_anomaly());
    }
}
