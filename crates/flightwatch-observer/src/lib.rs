//! Observer side of the Flightwatch telemetry monitor.
//!
//! This crate provides:
//!
//! - **[`BroadcastHub`]**, the registry of live observer sessions with
//!   snapshot-copy fan-out and post-pass eviction of failed sessions
//! - **`WebSocket` transport** (`/websocket`) adapting each connection to
//!   the hub's [`Session`] trait
//! - **REST endpoints** for the latest snapshot, status, health, anomaly
//!   injection and operator broadcasts
//!
//! # Architecture
//!
//! The hub is the engine's [`SnapshotSink`](flightwatch_core::SnapshotSink):
//! the scheduler publishes each classified snapshot into it. REST handlers
//! reach the same hub and pipeline through [`AppState`].

pub mod error;
pub mod handlers;
pub mod hub;
pub mod message;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::ObserverError;
pub use hub::{BroadcastHub, DeliveryError, Session};
pub use message::{CONNECTION_GREETING, HubError, HubMessage};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{ObserverHandle, spawn_observer};
pub use state::{AppState, TransportConfig};
pub use ws::WsSession;
