/// Zocket Error Types
///
/// Capability violations and protocol-sequence violations are surfaced to the
/// caller; transport failures pass through unchanged; resolution failures are
/// internal and degrade to the literal endpoint.
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::role::Operation;
use crate::socket_type::SocketType;

/// Failure reported by the underlying messaging engine.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Operation cannot be accomplished in the socket's current state (EFSM)
    #[error("Operation cannot be accomplished in current state")]
    InvalidState,

    /// Any other engine failure, carried verbatim
    #[error("{message}")]
    Native { code: i32, message: String },

    /// IO error from the operating system
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Create a native engine error from an errno and its message
    pub fn native(code: i32, message: impl Into<String>) -> Self {
        Self::Native {
            code,
            message: message.into(),
        }
    }

    /// Check if this is the engine's FSM-violation signal
    #[must_use]
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState)
    }
}

/// Main error type for socket facade operations
#[derive(Error, Debug)]
pub enum SocketError {
    /// The socket role statically forbids this operation
    #[error("API {operation} not supported for {socket_type} sockets!")]
    UnsupportedOperation {
        operation: Operation,
        socket_type: SocketType,
    },

    /// A REQ/REP socket was used out of its send/recv alternation
    #[error(
        "{operation} out of sequence on {socket_type} socket: REQ/REP sockets must strictly \
         alternate send and recv calls, make sure no out-of-band data is sent or received \
         on this socket pair"
    )]
    ProtocolSequence {
        operation: Operation,
        socket_type: SocketType,
    },

    /// A multipart message with no frames
    #[error("Cannot send an empty multipart message")]
    EmptyMessage,

    /// Transport failure, passed through unchanged
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type alias for socket facade operations
pub type Result<T> = std::result::Result<T, SocketError>;

impl SocketError {
    /// Check if this error is a capability violation
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }

    /// Check if this error is a translated REQ/REP sequence violation
    #[must_use]
    pub const fn is_protocol_sequence(&self) -> bool {
        matches!(self, Self::ProtocolSequence { .. })
    }
}

/// Translate a transport failure raised during `operation` on `socket_type`.
///
/// REQ and REP sockets turn the engine's FSM signal into
/// [`SocketError::ProtocolSequence`]. Every other failure, and every failure
/// on other socket types, passes through as [`SocketError::Transport`].
pub fn translate_transport_error(
    socket_type: SocketType,
    operation: Operation,
    err: TransportError,
) -> SocketError {
    if socket_type.is_request_reply() && err.is_invalid_state() {
        SocketError::ProtocolSequence {
            operation,
            socket_type,
        }
    } else {
        SocketError::Transport(err)
    }
}

/// Directory lookup failure.
///
/// Never surfaced by bind/connect: the facade falls back to the literal
/// endpoint and reports the reason through logs and monitor events.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Name is not of the form `<service>.<domain>`
    #[error("Invalid service name: {0}")]
    InvalidName(String),

    /// Socket-level failure talking to the nameserver
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No nameserver answered within the configured timeout
    #[error("Lookup of {query} timed out after {timeout:?}")]
    Timeout { query: String, timeout: Duration },

    /// Nameserver answered with a failure response code
    #[error("Lookup of {query} failed with response code {rcode}")]
    ResponseCode { query: String, rcode: u8 },

    /// Response did not fit in a UDP datagram
    #[error("Truncated response for {0}")]
    Truncated(String),

    /// Response could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Host name has no address
    #[error("No address found for host {0}")]
    NoAddress(String),

    /// No nameserver is configured
    #[error("No nameservers configured")]
    NoNameservers,
}
