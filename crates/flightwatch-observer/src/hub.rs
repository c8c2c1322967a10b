//! The observer session registry and broadcast fan-out.
//!
//! [`BroadcastHub`] keeps every live [`Session`] keyed by [`SessionId`].
//! A broadcast works on a point-in-time copy of the registry, so sessions
//! may connect or disconnect while a pass is running without the pass
//! seeing a half-updated map. Sessions that fail during a pass are
//! collected and evicted once the pass is over; the remaining sessions
//! always receive the message.
//!
//! Sends happen outside the registry lock, so a session implementation
//! may call back into the hub without deadlocking.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use flightwatch_core::SnapshotSink;
use flightwatch_types::{SessionId, Snapshot};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::message::{CONNECTION_GREETING, HubMessage};

/// Why a single delivery failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The session is no longer open.
    #[error("session closed")]
    Closed,

    /// The session's outbound queue is full.
    #[error("session outbound queue full")]
    Backpressure,

    /// The transport did not accept the frame in time.
    #[error("send timed out")]
    Timeout,

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// One connected observer.
///
/// `send` must return promptly: it is called on the scheduler task for
/// every tick. Transports that write to a socket should enqueue and let a
/// writer task do the blocking work.
pub trait Session: Send + Sync {
    /// Stable identity of this session.
    fn id(&self) -> SessionId;

    /// Whether the session can still accept frames.
    fn is_open(&self) -> bool;

    /// Deliver one encoded text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the frame could not be handed to the
    /// transport. The hub evicts the session afterwards.
    fn send(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Registry of live observer sessions.
#[derive(Default)]
pub struct BroadcastHub {
    sessions: RwLock<BTreeMap<SessionId, Arc<dyn Session>>>,
}

impl BroadcastHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Greet a session, then register it.
    ///
    /// The greeting goes out before the session is visible to any
    /// broadcast pass, so it is always the session's first frame. A failed
    /// greeting does not prevent registration; the session is evicted on
    /// the next broadcast if it is still unhealthy.
    pub fn connect(&self, session: Arc<dyn Session>) {
        let id = session.id();
        let greeting = HubMessage::Connection {
            message: CONNECTION_GREETING,
        };
        match greeting.encode() {
            Ok(text) => {
                if let Err(e) = session.send(&text) {
                    warn!(session = %id, error = %e, "Failed to greet observer");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode greeting"),
        }

        let total = {
            let mut sessions = self.write();
            sessions.insert(id, session);
            sessions.len()
        };
        info!(session = %id, total, "Observer connected");
    }

    /// Remove a session. Returns `false` if it was not registered.
    pub fn disconnect(&self, id: SessionId, reason: &str) -> bool {
        let removed = self.write().remove(&id).is_some();
        if removed {
            info!(session = %id, reason, total = self.connected_count(), "Observer disconnected");
        }
        removed
    }

    /// Number of registered sessions.
    pub fn connected_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Encode `message` once and deliver it to every registered session.
    ///
    /// Returns the number of sessions that accepted the frame. An encoding
    /// failure drops the message without touching any session.
    pub fn broadcast(&self, message: &HubMessage<'_>) -> usize {
        match message.encode() {
            Ok(text) => self.deliver_all(message.kind(), &text),
            Err(e) => {
                warn!(kind = message.kind(), error = %e, "Dropping unencodable broadcast");
                0
            }
        }
    }

    /// Push a classified snapshot to every session.
    pub fn broadcast_snapshot(&self, snapshot: &Snapshot) -> usize {
        self.broadcast(&HubMessage::AircraftData(snapshot))
    }

    /// Push an operator alert to every session. Absent fields encode as
    /// `null`.
    pub fn broadcast_alert(
        &self,
        alert_type: Option<&str>,
        message: Option<&str>,
        severity: Option<&str>,
    ) -> usize {
        self.broadcast(&HubMessage::Alert {
            alert_type,
            message,
            severity,
        })
    }

    /// Push an arbitrary payload under a caller-chosen `type` tag.
    pub fn broadcast_custom<T: Serialize + ?Sized>(&self, tag: &str, payload: &T) -> usize {
        match serde_json::to_value(payload) {
            Ok(data) => self.broadcast(&HubMessage::Custom { tag, data: &data }),
            Err(e) => {
                warn!(kind = tag, error = %e, "Dropping unencodable broadcast");
                0
            }
        }
    }

    /// Reply to a message received from `id` by echoing it back.
    ///
    /// Returns `true` if the echo was delivered. A session whose echo
    /// fails is evicted.
    pub fn handle_incoming(&self, id: SessionId, content: &str) -> bool {
        let Some(session) = self.get(id) else {
            debug!(session = %id, "Message from unregistered session ignored");
            return false;
        };
        debug!(session = %id, len = content.len(), "Observer message received");

        let text = match (HubMessage::Echo { data: content }).encode() {
            Ok(text) => text,
            Err(e) => {
                warn!(session = %id, error = %e, "Failed to encode echo");
                return false;
            }
        };
        match deliver(session.as_ref(), &text) {
            Ok(()) => true,
            Err(e) => {
                self.evict(vec![(id, e)]);
                false
            }
        }
    }

    fn deliver_all(&self, kind: &str, text: &str) -> usize {
        let targets: Vec<Arc<dyn Session>> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut delivered = 0_usize;
        let mut failed = Vec::new();
        for session in &targets {
            match deliver(session.as_ref(), text) {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err(e) => failed.push((session.id(), e)),
            }
        }

        let evicted = failed.len();
        self.evict(failed);
        debug!(kind, delivered, evicted, "Broadcast pass complete");
        delivered
    }

    fn evict(&self, failed: Vec<(SessionId, DeliveryError)>) {
        if failed.is_empty() {
            return;
        }
        let mut sessions = self.write();
        for (id, reason) in failed {
            if sessions.remove(&id).is_some() {
                warn!(session = %id, reason = %reason, "Evicting observer");
            }
        }
    }

    fn get(&self, id: SessionId) -> Option<Arc<dyn Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<SessionId, Arc<dyn Session>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("connected", &self.connected_count())
            .finish()
    }
}

impl SnapshotSink for BroadcastHub {
    fn publish(&self, snapshot: &Snapshot) {
        self.broadcast_snapshot(snapshot);
    }
}

/// Closed sessions are never written to.
fn deliver(session: &dyn Session, text: &str) -> Result<(), DeliveryError> {
    if !session.is_open() {
        return Err(DeliveryError::Closed);
    }
    session.send(text)
}
