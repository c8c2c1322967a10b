//! Observer HTTP server lifecycle.
//!
//! [`bind`] resolves and binds the listening socket; [`serve`] runs the
//! router on it until the shutdown future resolves. They are separate so
//! a bad address or a taken port fails at startup rather than inside a
//! background task.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use flightwatch_core::ServerSettings;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Parse `host:port` from the settings and bind a listener.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or the port
/// cannot be bound.
pub async fn bind(settings: &ServerSettings) -> Result<TcpListener, ServerError> {
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))
}

/// Serve the observer API on `listener` until `shutdown` resolves.
///
/// Open `WebSocket` sessions are not waited for; they end when their
/// socket closes or the runtime stops.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] on a fatal I/O error.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Serve(format!("listener has no address: {e}")))?;
    info!(%addr, "Observer server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Observer server stopped");
    Ok(())
}

/// Bind and serve in one call.
///
/// # Errors
///
/// Returns [`ServerError`] if binding or serving fails.
pub async fn start_server<F>(
    settings: &ServerSettings,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(settings).await?;
    serve(listener, state, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_host_is_a_bind_error() {
        let settings = ServerSettings {
            host: "not an address".to_owned(),
            ..ServerSettings::default()
        };
        assert!(matches!(bind(&settings).await, Err(ServerError::Bind(_))));
    }

    #[tokio::test]
    async fn ephemeral_port_binds() {
        let settings = ServerSettings {
            host: "127.0.0.1".to_owned(),
            port: 0,
            ..ServerSettings::default()
        };
        let listener = bind(&settings).await;
        assert!(listener.is_ok_and(|l| l.local_addr().is_ok()));
    }
}
