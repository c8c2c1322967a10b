//! Wire messages pushed to observers.
//!
//! Every frame is a JSON object with a `type` discriminator. Message kinds
//! form a closed set; each kind has exactly one encoder.
//!
//! | `type` | Shape |
//! |--------|-------|
//! | `connection` | `{type, message}` |
//! | `aircraft_data` | `{type, ...snapshot fields}` |
//! | `alert` | `{type, alertType, message, severity}` (nullable) |
//! | `echo` | `{type, data}` |
//! | caller tag | `{type: <tag>, data: <payload>}` |

use flightwatch_types::Snapshot;
use serde::Serialize;

/// Greeting sent once to every new session.
pub const CONNECTION_GREETING: &str = "Connected to Aircraft Monitoring System";

/// Errors raised while encoding a message.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The message or its payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage<'a> {
    /// Sent once when a session registers.
    Connection {
        /// Greeting text.
        message: &'a str,
    },
    /// A classified telemetry snapshot.
    AircraftData(&'a Snapshot),
    /// An operator-triggered alert.
    Alert {
        /// Alert category (e.g. `"ENGINE"`).
        alert_type: Option<&'a str>,
        /// Alert text.
        message: Option<&'a str>,
        /// Severity label (e.g. `"WARNING"`).
        severity: Option<&'a str>,
    },
    /// Verbatim reply to a message received from a session.
    Echo {
        /// The received content.
        data: &'a str,
    },
    /// Caller-tagged envelope around an already-encoded payload.
    Custom {
        /// Value of the `type` field.
        tag: &'a str,
        /// Value of the `data` field.
        data: &'a serde_json::Value,
    },
}

/// Serde view of the fixed-tag kinds.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame<'a> {
    Connection {
        message: &'a str,
    },
    AircraftData(&'a Snapshot),
    Alert {
        #[serde(rename = "alertType")]
        alert_type: Option<&'a str>,
        message: Option<&'a str>,
        severity: Option<&'a str>,
    },
    Echo {
        data: &'a str,
    },
}

/// Serde view of a custom envelope.
#[derive(Serialize)]
struct CustomFrame<'a> {
    #[serde(rename = "type")]
    tag: &'a str,
    data: &'a serde_json::Value,
}

impl HubMessage<'_> {
    /// Value of the `type` field this message encodes with.
    pub const fn kind(&self) -> &str {
        match self {
            Self::Connection { .. } => "connection",
            Self::AircraftData(_) => "aircraft_data",
            Self::Alert { .. } => "alert",
            Self::Echo { .. } => "echo",
            Self::Custom { tag, .. } => *tag,
        }
    }

    /// Encode to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Serialization`] if serde rejects the message.
    pub fn encode(&self) -> Result<String, HubError> {
        let text = match *self {
            Self::Connection { message } => serde_json::to_string(&Frame::Connection { message })?,
            Self::AircraftData(snapshot) => {
                serde_json::to_string(&Frame::AircraftData(snapshot))?
            }
            Self::Alert {
                alert_type,
                message,
                severity,
            } => serde_json::to_string(&Frame::Alert {
                alert_type,
                message,
                severity,
            })?,
            Self::Echo { data } => serde_json::to_string(&Frame::Echo { data })?,
            Self::Custom { tag, data } => serde_json::to_string(&CustomFrame { tag, data })?,
        };
        Ok(text)
    }
}
