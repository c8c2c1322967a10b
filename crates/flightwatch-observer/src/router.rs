//! Axum router construction for the observer API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// - `GET /websocket` -- observer `WebSocket` session
/// - `GET /api/aircraft/data` -- latest snapshot (204 before the first tick)
/// - `GET /api/aircraft/status` -- generation and session status
/// - `GET /api/aircraft/health` -- liveness
/// - `POST /api/aircraft/simulate/{subsystem}-anomaly` -- anomaly injection
/// - `POST /api/aircraft/alert` -- operator alert broadcast
/// - `POST /api/aircraft/broadcast` -- tagged custom broadcast
/// - `POST /api/aircraft/generate` -- on-demand pipeline pass
///
/// CORS allows any origin so a dashboard served elsewhere can connect.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/websocket", get(ws::ws_observer))
        .route("/api/aircraft/data", get(handlers::get_data))
        .route("/api/aircraft/status", get(handlers::get_status))
        .route("/api/aircraft/health", get(handlers::get_health))
        .route(
            "/api/aircraft/simulate/{action}",
            post(handlers::simulate_anomaly),
        )
        .route("/api/aircraft/alert", post(handlers::send_alert))
        .route("/api/aircraft/broadcast", post(handlers::broadcast_custom))
        .route("/api/aircraft/generate", post(handlers::generate_now))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
