//! Synthetic telemetry generation.
//!
//! Each metric is drawn independently from a cruise range that sits well
//! inside the safety envelope, except for two correlations:
//!
//! - Mach is derived from airspeed and altitude, never drawn.
//! - Engine temperature runs hotter when RPM is drawn high.
//!
//! A subsystem the [`InjectionController`](crate::injection::InjectionController)
//! reports as active is drawn from a forced range strictly outside the
//! envelope instead, so the following classification always flags it.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::Utc;
use flightwatch_types::{Snapshot, Subsystem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::TelemetryError;

/// RPM above which the engine temperature range shifts upward.
const HIGH_RPM_THRESHOLD: f64 = 2400.0;

/// Speed of sound at sea level in knots, before altitude correction.
const SEA_LEVEL_SPEED_OF_SOUND_KTS: f64 = 661.5;

/// Knots of speed-of-sound correction per foot of altitude.
const SPEED_OF_SOUND_ALTITUDE_FACTOR: f64 = 0.001;

/// Maximum ground speed deviation from airspeed (wind component).
const WIND_COMPONENT_KTS: f64 = 20.0;

/// A source of raw (unclassified) snapshots.
///
/// [`TelemetryGenerator`] is the production implementation; tests swap in
/// scripted or failing sources.
pub trait TelemetrySource: Send {
    /// Produce one raw snapshot, forcing every subsystem in `forced` out
    /// of envelope.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Upstream`] if no snapshot can be produced.
    fn produce(&mut self, forced: &BTreeSet<Subsystem>) -> Result<Snapshot, TelemetryError>;
}

/// Mach number for an airspeed (knots) at an altitude (feet).
pub fn mach_for(airspeed: f64, altitude: f64) -> f64 {
    airspeed / altitude.mul_add(SPEED_OF_SOUND_ALTITUDE_FACTOR, SEA_LEVEL_SPEED_OF_SOUND_KTS)
}

/// Random-draw telemetry generator.
#[derive(Debug)]
pub struct TelemetryGenerator {
    rng: StdRng,
}

impl TelemetryGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator from an optional configured seed.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }

    fn draw(&mut self, range: RangeInclusive<f64>) -> f64 {
        self.rng.random_range(range)
    }

    fn fill_engine(&mut self, s: &mut Snapshot, forced: bool) {
        if forced {
            s.engine_rpm = self.draw(3100.0..=3500.0);
            s.engine_temperature = self.draw(210.0..=260.0);
            s.oil_pressure = self.draw(5.0..=18.0);
            s.oil_temperature = self.draw(125.0..=150.0);
            return;
        }
        s.engine_rpm = self.draw(1800.0..=2600.0);
        s.engine_temperature = if s.engine_rpm > HIGH_RPM_THRESHOLD {
            self.draw(135.0..=185.0)
        } else {
            self.draw(120.0..=170.0)
        };
        s.oil_pressure = self.draw(35.0..=65.0);
        s.oil_temperature = self.draw(70.0..=100.0);
    }

    fn fill_fuel(&mut self, s: &mut Snapshot, forced: bool) {
        if forced {
            s.fuel_level = self.draw(5.0..=18.0);
            s.fuel_consumption = self.draw(1100.0..=1400.0);
            s.fuel_pressure = self.draw(2.0..=8.0);
        } else {
            s.fuel_level = self.draw(60.0..=90.0);
            s.fuel_consumption = self.draw(200.0..=320.0);
            s.fuel_pressure = self.draw(20.0..=35.0);
        }
        s.fuel_temperature = self.draw(10.0..=30.0);
    }

    fn fill_hydraulic(&mut self, s: &mut Snapshot, forced: bool) {
        if forced {
            s.hydraulic_pressure = self.draw(1500.0..=1900.0);
            s.hydraulic_temperature = self.draw(85.0..=100.0);
            s.hydraulic_fluid_level = self.draw(60.0..=75.0);
        } else {
            s.hydraulic_pressure = self.draw(2500.0..=3200.0);
            s.hydraulic_temperature = self.draw(40.0..=65.0);
            s.hydraulic_fluid_level = self.draw(90.0..=100.0);
        }
    }

    fn fill_flight(&mut self, s: &mut Snapshot, altitude_forced: bool, airspeed_forced: bool) {
        if altitude_forced {
            s.altitude = self.draw(46_000.0..=50_000.0);
            s.vertical_speed = self.draw(5500.0..=7000.0);
        } else {
            s.altitude = self.draw(30_000.0..=40_000.0);
            s.vertical_speed = self.draw(-500.0..=500.0);
        }
        s.airspeed = if airspeed_forced {
            self.draw(620.0..=700.0)
        } else {
            self.draw(400.0..=500.0)
        };
        s.ground_speed = s.airspeed + self.draw(-WIND_COMPONENT_KTS..=WIND_COMPONENT_KTS);
        s.mach_number = mach_for(s.airspeed, s.altitude);
    }

    fn fill_cabin_and_electrical(&mut self, s: &mut Snapshot) {
        s.cabin_pressure = self.draw(11.0..=13.0);
        s.cabin_temperature = self.draw(22.0..=26.0);
        s.battery_voltage = self.draw(28.0..=30.0);
        s.generator_output = self.draw(115.0..=125.0);
    }
}

impl Default for TelemetryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for TelemetryGenerator {
    fn produce(&mut self, forced: &BTreeSet<Subsystem>) -> Result<Snapshot, TelemetryError> {
        let mut s = Snapshot::at(Utc::now());
        self.fill_engine(&mut s, forced.contains(&Subsystem::Engine));
        self.fill_fuel(&mut s, forced.contains(&Subsystem::Fuel));
        self.fill_hydraulic(&mut s, forced.contains(&Subsystem::Hydraulic));
        self.fill_flight(
            &mut s,
            forced.contains(&Subsystem::Altitude),
            forced.contains(&Subsystem::Airspeed),
        );
        self.fill_cabin_and_electrical(&mut s);
        Ok(s)
    }
}
