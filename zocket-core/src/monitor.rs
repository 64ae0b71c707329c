//! Socket event monitoring.
//!
//! Provides event streams for tracking binds, connects and endpoint
//! resolution on a socket facade.

use std::fmt;

/// Socket lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Socket successfully bound to an endpoint.
    Bound(String),

    /// Socket successfully connected to an endpoint.
    Connected(String),

    /// Bind operation failed.
    BindFailed { endpoint: String, reason: String },

    /// Connection attempt failed.
    ConnectFailed { endpoint: String, reason: String },

    /// A bare service name was resolved through SRV records.
    Resolved { name: String, endpoint: String },

    /// Resolution was not possible; the literal name is used instead.
    ResolutionFallback { name: String, reason: String },
}

impl fmt::Display for SocketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound(ep) => write!(f, "Bound to {ep}"),
            Self::Connected(ep) => write!(f, "Connected to {ep}"),
            Self::BindFailed { endpoint, reason } => {
                write!(f, "Bind failed for {endpoint}: {reason}")
            }
            Self::ConnectFailed { endpoint, reason } => {
                write!(f, "Connect failed for {endpoint}: {reason}")
            }
            Self::Resolved { name, endpoint } => write!(f, "Resolved {name} to {endpoint}"),
            Self::ResolutionFallback { name, reason } => {
                write!(f, "Using {name} unresolved: {reason}")
            }
        }
    }
}

/// Handle for receiving socket events.
pub type SocketMonitor = flume::Receiver<SocketEvent>;

/// Sender side of a monitor, held by the socket.
pub type SocketEventSender = flume::Sender<SocketEvent>;

/// Creates a new monitoring channel pair.
#[must_use]
pub fn create_monitor() -> (SocketEventSender, SocketMonitor) {
    flume::unbounded()
}
