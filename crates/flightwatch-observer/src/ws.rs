//! `WebSocket` transport for observer sessions.
//!
//! Clients connect to `GET /websocket`. Each connection becomes a
//! [`WsSession`] registered with the [`BroadcastHub`](crate::hub::BroadcastHub):
//!
//! - The hub's `send` only enqueues onto a bounded channel, so a slow
//!   client never stalls the scheduler. A full queue is reported as
//!   backpressure and the session is evicted.
//! - A writer task drains the queue onto the socket, bounding every write
//!   by the configured send timeout. A failed or timed-out write marks the
//!   session closed.
//! - The reader loop echoes text frames back through the hub and
//!   deregisters the session when the client goes away.

use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use flightwatch_types::SessionId;
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::hub::{DeliveryError, Session};
use crate::state::AppState;

/// A [`Session`] backed by a bounded outbound queue.
#[derive(Debug)]
pub struct WsSession {
    id: SessionId,
    open: Arc<AtomicBool>,
    tx: mpsc::Sender<String>,
}

impl WsSession {
    /// Create a session and the receiving end of its outbound queue.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let session = Self {
            id: SessionId::new(),
            open: Arc::new(AtomicBool::new(true)),
            tx,
        };
        (session, rx)
    }

    /// Mark the session closed; further sends fail with
    /// [`DeliveryError::Closed`].
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    fn open_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.open)
    }
}

impl Session for WsSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.tx.try_send(text.to_owned()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Backpressure,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Upgrade an HTTP request to an observer `WebSocket` session.
///
/// # Route
///
/// `GET /websocket`
pub async fn ws_observer(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Run one session: writer task out, reader loop in.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (sink, mut stream) = socket.split();
    let (session, rx) = WsSession::channel(state.transport.session_buffer);
    let session = Arc::new(session);
    let id = session.id();
    let writer = tokio::spawn(write_frames(
        sink,
        rx,
        session.open_flag(),
        id,
        state.transport.send_timeout,
    ));

    state.hub.connect(Arc::clone(&session) as Arc<dyn Session>);

    let reason = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                state.hub.handle_incoming(id, text.as_str());
            }
            Some(Ok(Message::Close(_))) | None => break "client closed",
            Some(Ok(_)) => {
                // Binary and control frames carry nothing to echo; axum
                // answers pings itself.
            }
            Some(Err(e)) => {
                debug!(session = %id, error = %e, "WebSocket read failed");
                break "read error";
            }
        }
    };

    session.close();
    state.hub.disconnect(id, reason);
    drop(session);
    if let Err(e) = writer.await {
        debug!(session = %id, error = %e, "WebSocket writer ended abnormally");
    }
}

/// Drain a session's queue onto `sink` until the queue ends or a write
/// fails.
///
/// Each write is bounded by `send_timeout`. On exit the session is marked
/// closed so the hub evicts it on its next pass.
async fn write_frames<S>(
    mut sink: S,
    mut rx: mpsc::Receiver<String>,
    open: Arc<AtomicBool>,
    id: SessionId,
    send_timeout: Duration,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let timeout_ms = u64::try_from(send_timeout.as_millis()).unwrap_or(u64::MAX);
    while let Some(text) = rx.recv().await {
        match tokio::time::timeout(send_timeout, sink.send(Message::Text(text.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(session = %id, error = %e, "WebSocket write failed");
                break;
            }
            Err(_) => {
                warn!(session = %id, timeout_ms, "WebSocket write timed out");
                break;
            }
        }
    }
    open.store(false, Ordering::Release);

    match tokio::time::timeout(send_timeout, sink.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(session = %id, error = %e, "WebSocket close failed"),
        Err(_) => debug!(session = %id, timeout_ms, "WebSocket close timed out"),
    }
}
