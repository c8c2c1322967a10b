//! Static safety envelope table.
//!
//! Maps every bounded metric to an inclusive `[min, max]` range. Bounds may
//! be one-sided. The table is process-lifetime reference data: it is a
//! `const` match, never mutated, never loaded from configuration.

use flightwatch_types::{Snapshot, Subsystem};

/// An inclusive numeric range. `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
}

impl Bound {
    /// Two-sided inclusive range.
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Lower bound only.
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Upper bound only.
    pub const fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Whether `value` lies inside the bound.
    ///
    /// Non-finite values are never inside, even against an open side.
    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Every metric the envelope constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    /// Engine RPM.
    EngineRpm,
    /// Engine temperature.
    EngineTemperature,
    /// Oil pressure.
    OilPressure,
    /// Oil temperature.
    OilTemperature,
    /// Fuel level.
    FuelLevel,
    /// Fuel consumption.
    FuelConsumption,
    /// Fuel pressure.
    FuelPressure,
    /// Hydraulic pressure.
    HydraulicPressure,
    /// Hydraulic temperature.
    HydraulicTemperature,
    /// Hydraulic fluid level.
    HydraulicFluidLevel,
    /// Altitude.
    Altitude,
    /// Vertical speed.
    VerticalSpeed,
    /// Airspeed.
    Airspeed,
    /// Mach number.
    MachNumber,
}

impl Metric {
    /// The subsystem whose flag this metric contributes to.
    pub const fn subsystem(self) -> Subsystem {
        match self {
            Self::EngineRpm | Self::EngineTemperature | Self::OilPressure | Self::OilTemperature => {
                Subsystem::Engine
            }
            Self::FuelLevel | Self::FuelConsumption | Self::FuelPressure => Subsystem::Fuel,
            Self::HydraulicPressure | Self::HydraulicTemperature | Self::HydraulicFluidLevel => {
                Subsystem::Hydraulic
            }
            Self::Altitude | Self::VerticalSpeed => Subsystem::Altitude,
            Self::Airspeed | Self::MachNumber => Subsystem::Airspeed,
        }
    }

    /// Read this metric from a snapshot.
    pub const fn read(self, snapshot: &Snapshot) -> f64 {
        match self {
            Self::EngineRpm => snapshot.engine_rpm,
            Self::EngineTemperature => snapshot.engine_temperature,
            Self::OilPressure => snapshot.oil_pressure,
            Self::OilTemperature => snapshot.oil_temperature,
            Self::FuelLevel => snapshot.fuel_level,
            Self::FuelConsumption => snapshot.fuel_consumption,
            Self::FuelPressure => snapshot.fuel_pressure,
            Self::HydraulicPressure => snapshot.hydraulic_pressure,
            Self::HydraulicTemperature => snapshot.hydraulic_temperature,
            Self::HydraulicFluidLevel => snapshot.hydraulic_fluid_level,
            Self::Altitude => snapshot.altitude,
            Self::VerticalSpeed => snapshot.vertical_speed,
            Self::Airspeed => snapshot.airspeed,
            Self::MachNumber => snapshot.mach_number,
        }
    }

    /// Short name used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::EngineRpm => "engine_rpm",
            Self::EngineTemperature => "engine_temperature",
            Self::OilPressure => "oil_pressure",
            Self::OilTemperature => "oil_temperature",
            Self::FuelLevel => "fuel_level",
            Self::FuelConsumption => "fuel_consumption",
            Self::FuelPressure => "fuel_pressure",
            Self::HydraulicPressure => "hydraulic_pressure",
            Self::HydraulicTemperature => "hydraulic_temperature",
            Self::HydraulicFluidLevel => "hydraulic_fluid_level",
            Self::Altitude => "altitude",
            Self::VerticalSpeed => "vertical_speed",
            Self::Airspeed => "airspeed",
            Self::MachNumber => "mach_number",
        }
    }
}

/// The safety envelope table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyEnvelope;

impl SafetyEnvelope {
    /// Inclusive bound for one metric.
    pub const fn bound(metric: Metric) -> Bound {
        match metric {
            Metric::EngineRpm => Bound::between(500.0, 3000.0),
            Metric::EngineTemperature => Bound::at_most(200.0),
            Metric::OilPressure => Bound::between(20.0, 100.0),
            Metric::OilTemperature => Bound::at_most(120.0),
            Metric::FuelLevel => Bound::at_least(20.0),
            Metric::FuelConsumption => Bound::at_most(1000.0),
            Metric::FuelPressure => Bound::between(10.0, 50.0),
            Metric::HydraulicPressure => Bound::between(2000.0, 3500.0),
            Metric::HydraulicTemperature => Bound::at_most(80.0),
            Metric::HydraulicFluidLevel => Bound::at_least(80.0),
            Metric::Altitude => Bound::at_most(45_000.0),
            Metric::VerticalSpeed => Bound::between(-5000.0, 5000.0),
            Metric::Airspeed => Bound::at_most(600.0),
            Metric::MachNumber => Bound::at_most(0.9),
        }
    }

    /// Metrics that contribute to one subsystem's flag.
    pub const fn metrics(subsystem: Subsystem) -> &'static [Metric] {
        match subsystem {
            Subsystem::Engine => &[
                Metric::EngineRpm,
                Metric::EngineTemperature,
                Metric::OilPressure,
                Metric::OilTemperature,
            ],
            Subsystem::Fuel => &[
                Metric::FuelLevel,
                Metric::FuelConsumption,
                Metric::FuelPressure,
            ],
            Subsystem::Hydraulic => &[
                Metric::HydraulicPressure,
                Metric::HydraulicTemperature,
                Metric::HydraulicFluidLevel,
            ],
            Subsystem::Altitude => &[Metric::Altitude, Metric::VerticalSpeed],
            Subsystem::Airspeed => &[Metric::Airspeed, Metric::MachNumber],
        }
    }

    /// Whether every metric of `subsystem` in `snapshot` is inside its bound.
    pub fn within(subsystem: Subsystem, snapshot: &Snapshot) -> bool {
        Self::metrics(subsystem)
            .iter()
            .all(|metric| Self::bound(*metric).contains(metric.read(snapshot)))
    }
}
