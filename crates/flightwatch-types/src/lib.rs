//! Shared type definitions for the Flightwatch telemetry monitor.
//!
//! This crate is the single source of truth for the data that flows
//! between the telemetry core and the observer transport. Types defined
//! here flow downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for observer sessions
//! - [`enums`] -- Subsystem and aggregate status enumerations
//! - [`snapshot`] -- The timestamped telemetry record

pub mod enums;
pub mod ids;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use enums::{Subsystem, SystemStatus, UnknownSubsystem};
pub use ids::SessionId;
pub use snapshot::Snapshot;

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings to `bindings/` relative to the crate
        // root when export_all is invoked.
        use ts_rs::TS;

        let _ = crate::ids::SessionId::export_all();
        let _ = crate::enums::Subsystem::export_all();
        let _ = crate::enums::SystemStatus::export_all();
        let _ = crate::snapshot::Snapshot::export_all();
    }
}
