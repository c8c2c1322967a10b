//! Enumeration types for the telemetry monitor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One of the five anomaly groups a snapshot is classified into.
///
/// Each group owns one boolean flag on [`Snapshot`](crate::Snapshot) and is
/// also the unit an operator can force out of envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Subsystem {
    /// RPM, engine temperature, oil pressure and oil temperature.
    Engine,
    /// Fuel level, consumption and pressure.
    Fuel,
    /// Hydraulic pressure, temperature and fluid level.
    Hydraulic,
    /// Altitude and vertical speed.
    Altitude,
    /// Airspeed and Mach number.
    Airspeed,
}

impl Subsystem {
    /// Every subsystem, in flag order.
    pub const ALL: [Self; 5] = [
        Self::Engine,
        Self::Fuel,
        Self::Hydraulic,
        Self::Altitude,
        Self::Airspeed,
    ];

    /// Lowercase slug used in URLs and configuration.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Fuel => "fuel",
            Self::Hydraulic => "hydraulic",
            Self::Altitude => "altitude",
            Self::Airspeed => "airspeed",
        }
    }

    /// Human-readable name (`"Engine"`, `"Fuel"`, ...).
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Engine => "Engine",
            Self::Fuel => "Fuel",
            Self::Hydraulic => "Hydraulic",
            Self::Altitude => "Altitude",
            Self::Airspeed => "Airspeed",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Returned when a string does not name a [`Subsystem`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subsystem: {0}")]
pub struct UnknownSubsystem(pub String);

impl FromStr for Subsystem {
    type Err = UnknownSubsystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sub| sub.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSubsystem(s.to_owned()))
    }
}

/// Aggregate status of a classified snapshot.
///
/// `Warning` if and only if at least one subsystem flag is raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum SystemStatus {
    /// Every metric is inside its safety envelope.
    #[default]
    Normal,
    /// At least one subsystem is out of envelope.
    Warning,
}

impl SystemStatus {
    /// Wire representation (`"NORMAL"` / `"WARNING"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsystem_parses_slugs_case_insensitively() {
        assert_eq!("engine".parse::<Subsystem>(), Ok(Subsystem::Engine));
        assert_eq!("Hydraulic".parse::<Subsystem>(), Ok(Subsystem::Hydraulic));
        assert_eq!(
            "rudder".parse::<Subsystem>(),
            Err(UnknownSubsystem("rudder".to_owned()))
        );
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&SystemStatus::Warning).unwrap_or_default();
        assert_eq!(json, "\"WARNING\"");
        assert_eq!(SystemStatus::Normal.as_str(), "NORMAL");
    }
}
