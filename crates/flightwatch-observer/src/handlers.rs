//! REST handlers for the observer API.
//!
//! Handlers are thin: they read the retained snapshot, forward operator
//! actions to the injection controller or the hub, and shape the JSON.
//! Status and health reads never fail; they report whatever is known.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use flightwatch_core::StatusReport;
use flightwatch_types::{Subsystem, SystemStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

/// Suffix every simulate action carries (`engine-anomaly`, ...).
const ANOMALY_SUFFIX: &str = "-anomaly";

/// Severity applied to operator alerts that omit one.
pub const DEFAULT_ALERT_SEVERITY: &str = "INFO";

/// Severity of the alert pushed when an anomaly is simulated.
const SIMULATION_ALERT_SEVERITY: &str = "WARNING";

/// Alert type and text announced to observers for a simulated anomaly.
const fn simulation_alert(subsystem: Subsystem) -> (&'static str, &'static str) {
    match subsystem {
        Subsystem::Engine => ("ENGINE", "Engine temperature anomaly detected"),
        Subsystem::Fuel => ("FUEL", "Low fuel level detected"),
        Subsystem::Hydraulic => ("HYDRAULIC", "Low hydraulic pressure detected"),
        Subsystem::Altitude => ("ALTITUDE", "Altitude limit exceeded"),
        Subsystem::Airspeed => ("AIRSPEED", "Airspeed limit exceeded"),
    }
}

/// `{message, status}` acknowledgement for operator actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Human-readable outcome.
    pub message: String,
    /// Always `"success"`.
    pub status: String,
    /// Sessions reached, for broadcast actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered: Option<usize>,
}

impl Ack {
    fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: "success".to_owned(),
            delivered: None,
        }
    }
}

/// Liveness report for `GET /api/aircraft/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Always `"UP"` while the server answers.
    pub status: &'static str,
    /// Time the report was built.
    pub timestamp: DateTime<Utc>,
    /// Live observer sessions.
    pub connected_clients: usize,
    /// Whether any snapshot has been generated yet.
    pub data_available: bool,
    /// Aggregate status of the latest snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_status: Option<SystemStatus>,
    /// Whether the latest snapshot has any anomaly raised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<bool>,
}

/// Body of `POST /api/aircraft/alert`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertRequest {
    /// Alert category.
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    /// Alert text.
    pub message: Option<String>,
    /// Severity label; [`DEFAULT_ALERT_SEVERITY`] when absent.
    pub severity: Option<String>,
}

/// Body of `POST /api/aircraft/broadcast`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomBroadcastRequest {
    /// Tag placed in the outbound `type` field.
    #[serde(rename = "type")]
    pub tag: String,
    /// Arbitrary payload placed in the outbound `data` field.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// `GET /api/aircraft/data` -- latest classified snapshot.
///
/// Returns `204 No Content` before the first tick.
pub async fn get_data(State(state): State<Arc<AppState>>) -> Response {
    state.pipeline.current().map_or_else(
        || StatusCode::NO_CONTENT.into_response(),
        |snapshot| Json(snapshot).into_response(),
    )
}

/// `GET /api/aircraft/status` -- generation and session status.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusReport> {
    let current = state.pipeline.current();
    Json(StatusReport::new(
        current.as_ref(),
        state.hub.connected_count(),
    ))
}

/// `GET /api/aircraft/health` -- liveness plus last-known status.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let current = state.pipeline.current();
    Json(HealthReport {
        status: "UP",
        timestamp: Utc::now(),
        connected_clients: state.hub.connected_count(),
        data_available: current.is_some(),
        system_status: current.as_ref().map(|s| s.status),
        anomalies: current.as_ref().map(flightwatch_types::Snapshot::has_any_anomaly),
    })
}

/// `POST /api/aircraft/simulate/{subsystem}-anomaly` -- force a subsystem
/// out of envelope for the configured number of ticks and warn observers.
///
/// # Errors
///
/// Returns [`ObserverError::NotFound`] for an unknown action.
pub async fn simulate_anomaly(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
) -> Result<Json<Ack>, ObserverError> {
    let subsystem = action
        .strip_suffix(ANOMALY_SUFFIX)
        .and_then(|slug| slug.parse::<Subsystem>().ok())
        .ok_or_else(|| ObserverError::NotFound(format!("unknown simulation: {action}")))?;

    state.injection().request(subsystem);
    let (alert_type, message) = simulation_alert(subsystem);
    state.hub.broadcast_alert(
        Some(alert_type),
        Some(message),
        Some(SIMULATION_ALERT_SEVERITY),
    );
    Ok(Json(Ack::success(format!(
        "{} anomaly simulation triggered",
        subsystem.display_name()
    ))))
}

/// `POST /api/aircraft/alert` -- broadcast an operator alert.
///
/// A missing severity is sent as [`DEFAULT_ALERT_SEVERITY`].
pub async fn send_alert(
    State(state): State<Arc<AppState>>,
    Json(alert): Json<AlertRequest>,
) -> Json<Ack> {
    let severity = alert.severity.as_deref().unwrap_or(DEFAULT_ALERT_SEVERITY);
    let delivered = state.hub.broadcast_alert(
        alert.alert_type.as_deref(),
        alert.message.as_deref(),
        Some(severity),
    );
    info!(
        alert_type = alert.alert_type.as_deref().unwrap_or_default(),
        severity,
        delivered,
        "Operator alert broadcast"
    );
    Json(Ack::success("Alert sent successfully"))
}

/// `POST /api/aircraft/broadcast` -- broadcast a caller-tagged payload.
pub async fn broadcast_custom(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CustomBroadcastRequest>,
) -> Json<Ack> {
    let delivered = state.hub.broadcast_custom(&request.tag, &request.data);
    Json(Ack {
        delivered: Some(delivered),
        ..Ack::success("Message broadcast")
    })
}

/// `POST /api/aircraft/generate` -- run one pipeline pass now and
/// broadcast the result.
///
/// # Errors
///
/// Returns [`ObserverError::Telemetry`] if generation or classification
/// fails. Unlike a scheduled tick, the failure is not swallowed.
pub async fn generate_now(
    State(state): State<Arc<AppState>>,
) -> Result<Json<flightwatch_types::Snapshot>, ObserverError> {
    let snapshot = state.pipeline.generate()?;
    state.hub.broadcast_snapshot(&snapshot);
    Ok(Json(snapshot))
}
