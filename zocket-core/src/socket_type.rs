//! Socket type enumeration for ZeroMQ socket roles.
//!
//! This module provides the `SocketType` enum which names the ten socket
//! roles the facade knows about. Capabilities for each role live in
//! [`crate::role`].

use std::fmt;
use std::str::FromStr;

/// ZeroMQ socket types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    /// PUB socket for publishing messages to subscribers
    Pub,

    /// SUB socket for subscribing to published messages
    Sub,

    /// PUSH socket for sending messages to pullers
    Push,

    /// PULL socket for receiving messages from pushers
    Pull,

    /// PAIR socket for exclusive bidirectional communication
    Pair,

    /// REQ socket for synchronous request-reply client
    Req,

    /// REP socket for synchronous request-reply server
    Rep,

    /// ROUTER socket for routing messages by identity
    Router,

    /// DEALER socket for asynchronous request-reply patterns
    Dealer,

    /// STREAM socket for raw TCP peers
    Stream,
}

impl SocketType {
    /// Every socket type, in declaration order.
    pub const ALL: [SocketType; 10] = [
        Self::Pub,
        Self::Sub,
        Self::Push,
        Self::Pull,
        Self::Pair,
        Self::Req,
        Self::Rep,
        Self::Router,
        Self::Dealer,
        Self::Stream,
    ];

    /// Get the socket type as a string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pub => "PUB",
            Self::Sub => "SUB",
            Self::Push => "PUSH",
            Self::Pull => "PULL",
            Self::Pair => "PAIR",
            Self::Req => "REQ",
            Self::Rep => "REP",
            Self::Router => "ROUTER",
            Self::Dealer => "DEALER",
            Self::Stream => "STREAM",
        }
    }

    /// Whether the transport enforces a strict send/recv alternation.
    #[inline]
    pub const fn is_request_reply(&self) -> bool {
        matches!(self, Self::Req | Self::Rep)
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a socket type label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown socket type: {0}")]
pub struct UnknownSocketType(pub String);

impl FromStr for SocketType {
    type Err = UnknownSocketType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSocketType(s.to_string()))
    }
}
