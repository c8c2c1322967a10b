//! Error types for the observer API.
//!
//! [`ObserverError`] converts into an Axum response with a JSON body of the
//! form `{"error": "...", "status": 404}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flightwatch_core::TelemetryError;

/// Errors surfaced by observer handlers.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource or action does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An on-demand pipeline run failed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

impl ObserverError {
    /// HTTP status this error maps to.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Telemetry(TelemetryError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Telemetry(TelemetryError::Upstream { .. }) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ObserverError::NotFound("x".to_owned()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ObserverError::from(TelemetryError::InvalidInput("x".to_owned())).status_code(),
            StatusCode::BAD_REQUEST
        );
        let upstream = ObserverError::from(TelemetryError::Upstream {
            stage: "generate",
            message: "down".to_owned(),
        });
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert!(upstream.to_string().contains("generate"));
    }
}
