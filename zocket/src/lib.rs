//! # Zocket
//!
//! ZeroMQ-style sockets with fixed roles and location-transparent endpoints.
//!
//! ## Architecture
//!
//! - **`zocket-core`**: Socket roles, capability table, endpoint parsing, errors
//! - **`zocket-resolv`**: DNS SRV service directory
//! - **`zocket`**: Socket facade and transports (this crate)
//!
//! ## Roles
//!
//! Every [`Socket`] is created with one [`SocketType`]. Operations its role
//! cannot perform (recv on PUB, send on SUB, ...) fail with
//! [`SocketError::UnsupportedOperation`] before the transport is called.
//! REQ and REP sockets report out-of-turn send/recv as
//! [`SocketError::ProtocolSequence`].
//!
//! ## Endpoints
//!
//! `bind`, `connect` and `connect_all` accept either a qualified endpoint
//! (`tcp://`, `ipc://`, `inproc://`, `pgm://`, `epgm://`) or a bare
//! `<service>.<domain>` name. Bare names are looked up as
//! `_<service>._tcp.<domain>` SRV records:
//!
//! ```rust,no_run
//! # #[cfg(feature = "zmq")]
//! # fn example() -> Result<(), zocket::SocketError> {
//! use zocket::prelude::*;
//! use zocket::zmq_transport::Context;
//!
//! let ctx = Context::new();
//! let mut push = ctx.socket(SocketType::Push)?;
//!
//! // Preferred record only (lowest priority, then highest weight)
//! push.connect("collector.example.com")?;
//!
//! // Or every published record
//! push.connect_all("collector.example.com")?;
//! println!("{push}");
//! # Ok(())
//! # }
//! ```
//!
//! Resolution never fails a bind or connect: without usable records the
//! name is handed to the transport as given.
//!
//! ## Transports
//!
//! - **`zmq`** feature - libzmq via the `zmq` crate
//! - Any other engine by implementing [`Transport`]

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Tracing setup for tests and demos.
pub mod dev_tracing;
pub mod resolver;
pub mod socket;
pub mod transport;

#[cfg(feature = "zmq")]
pub mod zmq_transport;

pub use bytes::Bytes;
pub use resolver::{EndpointResolver, Resolution};
pub use socket::{Socket, SocketState};
pub use transport::{EventMask, Transport, TransportResult};
pub use zocket_core::error::{SocketError, TransportError};
pub use zocket_core::role::{Operation, RoleCapability};
pub use zocket_core::socket_type::SocketType;

/// Convenient imports.
pub mod prelude {
    pub use super::{
        Bytes, EndpointResolver, EventMask, Operation, Resolution, RoleCapability, Socket,
        SocketError, SocketState, SocketType, Transport, TransportError,
    };
    pub use zocket_core::monitor::{SocketEvent, SocketMonitor};
    pub use zocket_core::service::{ServiceDirectory, ServiceRecord};
    pub use zocket_resolv::{DnsDirectory, ResolverConfig, StaticDirectory};
}
