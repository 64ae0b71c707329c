//! The messaging engine seam.
//!
//! A [`Transport`] is one engine socket of a fixed type. The facade owns it
//! exclusively and only ever hands it fully qualified endpoints.

use std::fmt;
use std::ops::BitOr;

use bytes::Bytes;
use zocket_core::error::TransportError;

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Readiness flags reported by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventMask(u8);

impl EventMask {
    /// No readiness
    pub const NONE: EventMask = EventMask(0);
    /// At least one message may be received without blocking
    pub const POLLIN: EventMask = EventMask(0x01);
    /// At least one message may be sent without blocking
    pub const POLLOUT: EventMask = EventMask(0x02);

    /// Build a mask from raw bits, dropping unknown flags.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x03)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every flag in `other` is set.
    #[inline]
    pub const fn contains(self, other: EventMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

impl fmt::Display for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.contains(Self::POLLIN), self.contains(Self::POLLOUT)) {
            (true, true) => f.write_str("POLLIN|POLLOUT"),
            (true, false) => f.write_str("POLLIN"),
            (false, true) => f.write_str("POLLOUT"),
            (false, false) => f.write_str("NONE"),
        }
    }
}

/// Raw operations of an engine socket.
///
/// Implementations report the engine's FSM violation as
/// [`TransportError::InvalidState`] and everything else verbatim.
pub trait Transport {
    /// Bind to a fully qualified endpoint.
    fn bind(&mut self, endpoint: &str) -> TransportResult<()>;

    /// Connect to a fully qualified endpoint.
    fn connect(&mut self, endpoint: &str) -> TransportResult<()>;

    /// Send one frame; `more` marks further frames of the same message.
    fn send(&mut self, frame: Bytes, more: bool) -> TransportResult<()>;

    /// Receive one frame. With `dontwait`, `Ok(None)` means nothing is queued.
    fn recv(&mut self, dontwait: bool) -> TransportResult<Option<Bytes>>;

    /// Current readiness, fetched from the engine on every call.
    fn events(&self) -> TransportResult<EventMask>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bind(&mut self, endpoint: &str) -> TransportResult<()> {
        (**self).bind(endpoint)
    }

    fn connect(&mut self, endpoint: &str) -> TransportResult<()> {
        (**self).connect(endpoint)
    }

    fn send(&mut self, frame: Bytes, more: bool) -> TransportResult<()> {
        (**self).send(frame, more)
    }

    fn recv(&mut self, dontwait: bool) -> TransportResult<Option<Bytes>> {
        (**self).recv(dontwait)
    }

    fn events(&self) -> TransportResult<EventMask> {
        (**self).events()
    }
}
