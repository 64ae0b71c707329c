//! Role-restricted socket facade.
//!
//! A [`Socket`] owns one engine socket, the role it was created with and an
//! endpoint resolver. Capability checks run before the engine is touched;
//! bare service names are resolved before bind/connect.
//!
//! # State Machine
//!
//! ```text
//! Unbound → bind() → Bound
//! Unbound → connect() / connect_all() → Connected
//! ```
//!
//! The state reflects the most recent successful bind or connect.

use std::fmt;

use bytes::Bytes;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};
use zocket_core::endpoint::has_protocol;
use zocket_core::error::{translate_transport_error, Result, SocketError};
use zocket_core::monitor::{create_monitor, SocketEvent, SocketEventSender, SocketMonitor};
use zocket_core::role::{Operation, RoleCapability};
use zocket_core::service::{ServiceDirectory, ServiceRecords};
use zocket_core::socket_type::SocketType;
use zocket_resolv::DnsDirectory;

use crate::resolver::{EndpointResolver, Resolution};
use crate::transport::{EventMask, Transport};

/// Binding state of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    /// No endpoint yet
    Unbound,
    /// Last successful operation was a bind
    Bound,
    /// Last successful operation was a connect
    Connected,
}

/// A socket of a fixed role over an engine transport.
///
/// ## Example
///
/// ```rust,no_run
/// use zocket::{Socket, SocketType};
/// # fn example<T: zocket::Transport>(transport: T) -> Result<(), zocket::SocketError> {
/// let mut socket = Socket::new(SocketType::Pub, transport, zocket_resolv::DnsDirectory::system());
/// socket.bind("tcp://127.0.0.1:5000")?;
/// assert_eq!(socket.to_string(), "PUB socket bound to tcp://127.0.0.1:5000");
///
/// // Recv is not part of a publisher's role
/// assert!(socket.recv().unwrap_err().is_unsupported());
/// # Ok(())
/// # }
/// ```
pub struct Socket<T, D = DnsDirectory> {
    role: &'static RoleCapability,
    transport: T,
    resolver: EndpointResolver<D>,
    state: SocketState,
    endpoints: Vec<String>,
    monitor: Option<SocketEventSender>,
}

impl<T: Transport, D: ServiceDirectory> Socket<T, D> {
    /// Wrap `transport` as a socket of `socket_type`, resolving names through `directory`.
    pub fn new(socket_type: SocketType, transport: T, directory: D) -> Self {
        Self::with_resolver(socket_type, transport, EndpointResolver::new(directory))
    }

    /// Wrap `transport` as a socket of `socket_type` with an existing resolver.
    pub fn with_resolver(
        socket_type: SocketType,
        transport: T,
        resolver: EndpointResolver<D>,
    ) -> Self {
        debug!("[Socket] Creating {} socket", socket_type);
        Self {
            role: RoleCapability::of(socket_type),
            transport,
            resolver,
            state: SocketState::Unbound,
            endpoints: Vec::new(),
            monitor: None,
        }
    }

    /// Bind to `uri`, resolving a bare service name to a single endpoint first.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` if the role may not bind, or the
    /// transport's error unchanged.
    pub fn bind(&mut self, uri: &str) -> Result<()> {
        self.role.check(Operation::Bind)?;
        let endpoint = self.resolve_endpoint(uri);
        debug!("[Socket] {} binding to {}", self.type_str(), endpoint);

        match self.transport.bind(&endpoint) {
            Ok(()) => {
                self.emit(SocketEvent::Bound(endpoint.clone()));
                self.record(SocketState::Bound, endpoint);
                Ok(())
            }
            Err(e) => {
                self.emit(SocketEvent::BindFailed {
                    endpoint,
                    reason: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Connect to `uri`, resolving a bare service name to a single endpoint first.
    ///
    /// # Errors
    ///
    /// Returns the transport's error unchanged.
    pub fn connect(&mut self, uri: &str) -> Result<()> {
        let endpoint = self.resolve_endpoint(uri);
        self.connect_endpoint(endpoint)
    }

    /// Connect to every endpoint published for `uri`.
    ///
    /// Qualified endpoints behave like [`connect`](Self::connect). Bare names
    /// connect once per SRV record, in answer order; with no records (or a
    /// failed lookup) the name is connected to as given.
    ///
    /// # Errors
    ///
    /// The first failing connect aborts the rest; earlier connects stay in place.
    pub fn connect_all(&mut self, uri: &str) -> Result<()> {
        if has_protocol(uri) {
            return self.connect(uri);
        }

        let records = match self.resolver.resolve_all(uri) {
            Ok(records) => records,
            Err(e) => {
                warn!("[Socket] Cannot resolve {}: {}, using it as given", uri, e);
                self.emit(SocketEvent::ResolutionFallback {
                    name: uri.to_string(),
                    reason: e.to_string(),
                });
                ServiceRecords::new()
            }
        };

        if records.is_empty() {
            debug!("[Socket] No SRV records for {}", uri);
            return self.connect_endpoint(uri.to_string());
        }

        for record in &records {
            let endpoint = self.resolver.record_endpoint(record);
            self.emit(SocketEvent::Resolved {
                name: uri.to_string(),
                endpoint: endpoint.clone(),
            });
            self.connect_endpoint(endpoint)?;
        }
        Ok(())
    }

    fn connect_endpoint(&mut self, endpoint: String) -> Result<()> {
        debug!("[Socket] {} connecting to {}", self.type_str(), endpoint);

        match self.transport.connect(&endpoint) {
            Ok(()) => {
                self.emit(SocketEvent::Connected(endpoint.clone()));
                self.record(SocketState::Connected, endpoint);
                Ok(())
            }
            Err(e) => {
                self.emit(SocketEvent::ConnectFailed {
                    endpoint,
                    reason: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    fn resolve_endpoint(&self, uri: &str) -> String {
        let resolution = self.resolver.resolve(uri);
        match &resolution {
            Resolution::Qualified(_) => {}
            Resolution::Resolved { name, endpoint } => self.emit(SocketEvent::Resolved {
                name: name.clone(),
                endpoint: endpoint.clone(),
            }),
            Resolution::Literal { name, reason } => self.emit(SocketEvent::ResolutionFallback {
                name: name.clone(),
                reason: reason.clone(),
            }),
        }
        resolution.into_endpoint()
    }

    fn record(&mut self, state: SocketState, endpoint: String) {
        self.endpoints.push(endpoint);
        self.state = state;
    }

    /// Send a single-frame message.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for receive-only roles, `ProtocolSequence`
    /// for a REQ/REP send out of turn, or the transport's error.
    pub fn send(&mut self, frame: impl Into<Bytes>) -> Result<()> {
        self.send_frame(frame.into(), false)
    }

    /// Send one frame of a multipart message, more frames to follow.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub fn send_more(&mut self, frame: impl Into<Bytes>) -> Result<()> {
        self.send_frame(frame.into(), true)
    }

    /// Send a multipart message.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus `EmptyMessage` for zero frames.
    pub fn send_multipart<I, F>(&mut self, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = F>,
        F: Into<Bytes>,
    {
        self.role.check(Operation::Send)?;
        let frames: SmallVec<[Bytes; 4]> = frames.into_iter().map(Into::into).collect();
        let Some(last) = frames.len().checked_sub(1) else {
            return Err(SocketError::EmptyMessage);
        };

        trace!("[Socket] {} sending {} frames", self.type_str(), frames.len());
        for (i, frame) in frames.into_iter().enumerate() {
            self.raw_send(frame, i < last)?;
        }
        Ok(())
    }

    fn send_frame(&mut self, frame: Bytes, more: bool) -> Result<()> {
        self.role.check(Operation::Send)?;
        trace!("[Socket] {} sending {} bytes (more: {})", self.type_str(), frame.len(), more);
        self.raw_send(frame, more)
    }

    fn raw_send(&mut self, frame: Bytes, more: bool) -> Result<()> {
        let socket_type = self.socket_type();
        self.transport
            .send(frame, more)
            .map_err(|e| translate_transport_error(socket_type, Operation::Send, e))
    }

    /// Receive one frame, blocking until it arrives.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(frame))` - A frame was received
    /// - `Ok(None)` - The transport gave up waiting (receive timeout)
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for send-only roles, `ProtocolSequence`
    /// for a REQ/REP recv out of turn, or the transport's error.
    pub fn recv(&mut self) -> Result<Option<Bytes>> {
        self.recv_frame(false)
    }

    /// Receive one frame if one is queued, without blocking.
    ///
    /// # Errors
    ///
    /// Same as [`recv`](Self::recv).
    pub fn recv_nonblock(&mut self) -> Result<Option<Bytes>> {
        self.recv_frame(true)
    }

    fn recv_frame(&mut self, dontwait: bool) -> Result<Option<Bytes>> {
        self.role.check(Operation::Recv)?;
        let socket_type = self.socket_type();
        let frame = self
            .transport
            .recv(dontwait)
            .map_err(|e| translate_transport_error(socket_type, Operation::Recv, e))?;
        if let Some(frame) = &frame {
            trace!("[Socket] {} received {} bytes", socket_type, frame.len());
        }
        Ok(frame)
    }

    /// Readiness as currently reported by the transport.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if readiness cannot be read.
    pub fn events(&self) -> Result<EventMask> {
        Ok(self.transport.events()?)
    }

    /// Whether a message can be received right now.
    ///
    /// # Errors
    ///
    /// Same as [`events`](Self::events).
    pub fn is_readable(&self) -> Result<bool> {
        Ok(self.events()?.contains(EventMask::POLLIN))
    }

    /// Whether a message can be sent right now.
    ///
    /// # Errors
    ///
    /// Same as [`events`](Self::events).
    pub fn is_writable(&self) -> Result<bool> {
        Ok(self.events()?.contains(EventMask::POLLOUT))
    }

    /// Whether pollers should watch this socket for readability by default.
    #[inline]
    pub fn poll_readable(&self) -> bool {
        self.role.poll_readable
    }

    /// Whether pollers should watch this socket for writability by default.
    #[inline]
    pub fn poll_writable(&self) -> bool {
        self.role.poll_writable
    }

    /// Enable monitoring for this socket.
    ///
    /// Returns a receiver for bind, connect and resolution events.
    pub fn monitor(&mut self) -> SocketMonitor {
        let (sender, receiver) = create_monitor();
        self.monitor = Some(sender);
        receiver
    }

    fn emit(&self, event: SocketEvent) {
        if let Some(monitor) = &self.monitor {
            let _ = monitor.send(event);
        }
    }
}

impl<T, D> Socket<T, D> {
    /// The socket's role.
    #[inline]
    pub fn socket_type(&self) -> SocketType {
        self.role.socket_type
    }

    /// Capabilities of this socket's role.
    #[inline]
    pub fn role(&self) -> &'static RoleCapability {
        self.role
    }

    /// Role label, e.g. `"PUB"`.
    #[inline]
    pub fn type_str(&self) -> &'static str {
        self.role.type_label()
    }

    /// State after the most recent successful bind or connect.
    #[inline]
    pub fn state(&self) -> SocketState {
        self.state
    }

    /// Every endpoint bound or connected to, in call order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// The first endpoint bound or connected to, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoints.first().map(String::as_str)
    }

    /// The underlying engine socket.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the engine socket, e.g. for socket options.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The endpoint resolver.
    pub fn resolver(&self) -> &EndpointResolver<D> {
        &self.resolver
    }
}

impl<T, D> fmt::Display for Socket<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            SocketState::Bound => write!(
                f,
                "{} socket bound to {}",
                self.type_str(),
                self.endpoints.join(", ")
            ),
            SocketState::Connected => write!(
                f,
                "{} socket connected to {}",
                self.type_str(),
                self.endpoints.join(", ")
            ),
            SocketState::Unbound => write!(f, "{} socket", self.type_str()),
        }
    }
}

impl<T, D> fmt::Debug for Socket<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("socket_type", &self.role.socket_type)
            .field("state", &self.state)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
