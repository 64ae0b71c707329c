//! Zocket Core
//!
//! This crate contains the transport-free building blocks:
//! - Socket roles (`socket_type`) and their static capabilities (`role`)
//! - Protocol detection and service names (`endpoint`)
//! - SRV records, preference order and the directory seam (`service`)
//! - Lifecycle events (`monitor`)
//! - Error types and FSM translation (`error`)

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
pub mod endpoint;
pub mod error;
pub mod monitor;
pub mod role;
pub mod service;
pub mod socket_type;

// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::endpoint::{has_protocol, tcp_endpoint, Protocol, ServiceName};
    pub use crate::error::{
        translate_transport_error, ResolutionError, SocketError, TransportError,
    };
    pub use crate::monitor::{SocketEvent, SocketMonitor};
    pub use crate::role::{Operation, RoleCapability};
    pub use crate::service::{select_preferred, ServiceDirectory, ServiceRecord, ServiceRecords};
    pub use crate::socket_type::SocketType;
}
