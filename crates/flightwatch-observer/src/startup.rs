//! Observer startup helper for the engine binary.
//!
//! [`spawn_observer`] binds eagerly, then runs the server on a background
//! Tokio task so it serves concurrently with the tick scheduler.

use std::net::SocketAddr;
use std::sync::Arc;

use flightwatch_core::ServerSettings;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// A running observer server.
#[derive(Debug)]
pub struct ObserverHandle {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ObserverHandle {
    /// Address the server is listening on.
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting requests and wait for the server task.
    ///
    /// # Errors
    ///
    /// Returns the server's own error, or [`ServerError::Serve`] if the
    /// task panicked.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        let _ = self.stop.send(());
        self.task
            .await
            .map_err(|e| ServerError::Serve(format!("observer task failed: {e}")))?
    }
}

/// Bind the observer server and serve it on a background task.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the configured address cannot be
/// bound. This is detected before the task is spawned.
pub async fn spawn_observer(
    settings: &ServerSettings,
    state: Arc<AppState>,
) -> Result<ObserverHandle, ServerError> {
    let listener = server::bind(settings).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("listener has no address: {e}")))?;
    let (stop, stopped) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let result = server::serve(listener, state, async move {
            let _ = stopped.await;
        })
        .await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Observer server exited with error");
        }
        result
    });

    tracing::info!(%addr, "Observer server spawned on background task");
    Ok(ObserverHandle { addr, stop, task })
}
