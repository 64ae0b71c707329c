//! libzmq-backed transport.
//!
//! ```rust,no_run
//! use zocket::zmq_transport::Context;
//! use zocket::SocketType;
//!
//! # fn example() -> Result<(), zocket::SocketError> {
//! let ctx = Context::new();
//! let mut publisher = ctx.bind(SocketType::Pub, "tcp://127.0.0.1:5000")?;
//! publisher.send("hello")?;
//!
//! // Resolves _collector._tcp.example.com and connects to every record
//! let mut push = ctx.socket(SocketType::Push)?;
//! push.connect_all("collector.example.com")?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use zocket_core::error::{Result, TransportError};
use zocket_core::socket_type::SocketType;
use zocket_resolv::{DnsDirectory, ResolverConfig};

use crate::resolver::EndpointResolver;
use crate::socket::Socket;
use crate::transport::{EventMask, Transport, TransportResult};

/// Map a libzmq error, keeping EFSM distinguishable.
fn zmq_error(e: zmq::Error) -> TransportError {
    match e {
        zmq::Error::EFSM => TransportError::InvalidState,
        other => TransportError::native(other.to_raw(), other.message()),
    }
}

fn zmq_type(socket_type: SocketType) -> zmq::SocketType {
    match socket_type {
        SocketType::Pub => zmq::PUB,
        SocketType::Sub => zmq::SUB,
        SocketType::Push => zmq::PUSH,
        SocketType::Pull => zmq::PULL,
        SocketType::Pair => zmq::PAIR,
        SocketType::Req => zmq::REQ,
        SocketType::Rep => zmq::REP,
        SocketType::Router => zmq::ROUTER,
        SocketType::Dealer => zmq::DEALER,
        SocketType::Stream => zmq::STREAM,
    }
}

/// One libzmq socket.
pub struct ZmqTransport {
    socket: zmq::Socket,
}

impl ZmqTransport {
    /// Create a libzmq socket of `socket_type` in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns libzmq's error if the socket cannot be created.
    pub fn new(ctx: &zmq::Context, socket_type: SocketType) -> TransportResult<Self> {
        Ok(Self {
            socket: ctx.socket(zmq_type(socket_type)).map_err(zmq_error)?,
        })
    }

    /// Subscribe a SUB socket to messages starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns libzmq's error, e.g. for non-SUB sockets.
    pub fn subscribe(&self, prefix: &[u8]) -> TransportResult<()> {
        self.socket.set_subscribe(prefix).map_err(zmq_error)
    }

    /// Set the receive timeout in milliseconds (-1 blocks forever).
    ///
    /// # Errors
    ///
    /// Returns libzmq's error if the option is rejected.
    pub fn set_recv_timeout(&self, millis: i32) -> TransportResult<()> {
        self.socket.set_rcvtimeo(millis).map_err(zmq_error)
    }

    /// Set the linger period in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns libzmq's error if the option is rejected.
    pub fn set_linger(&self, millis: i32) -> TransportResult<()> {
        self.socket.set_linger(millis).map_err(zmq_error)
    }

    /// The raw libzmq socket.
    pub fn inner(&self) -> &zmq::Socket {
        &self.socket
    }
}

impl Transport for ZmqTransport {
    fn bind(&mut self, endpoint: &str) -> TransportResult<()> {
        self.socket.bind(endpoint).map_err(zmq_error)
    }

    fn connect(&mut self, endpoint: &str) -> TransportResult<()> {
        self.socket.connect(endpoint).map_err(zmq_error)
    }

    fn send(&mut self, frame: Bytes, more: bool) -> TransportResult<()> {
        let flags = if more { zmq::SNDMORE } else { 0 };
        self.socket.send(&frame[..], flags).map_err(zmq_error)
    }

    fn recv(&mut self, dontwait: bool) -> TransportResult<Option<Bytes>> {
        let flags = if dontwait { zmq::DONTWAIT } else { 0 };
        match self.socket.recv_bytes(flags) {
            Ok(frame) => Ok(Some(Bytes::from(frame))),
            // Nothing queued, or receive timeout elapsed
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(zmq_error(e)),
        }
    }

    fn events(&self) -> TransportResult<EventMask> {
        let events = self.socket.get_events().map_err(zmq_error)?;
        let mut mask = EventMask::NONE;
        if events.contains(zmq::POLLIN) {
            mask = mask | EventMask::POLLIN;
        }
        if events.contains(zmq::POLLOUT) {
            mask = mask | EventMask::POLLOUT;
        }
        Ok(mask)
    }
}

/// A libzmq context that hands out facade sockets resolving through DNS.
pub struct Context {
    inner: zmq::Context,
    resolver: EndpointResolver<DnsDirectory>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Context using the system nameservers.
    pub fn new() -> Self {
        Self::with_resolver_config(ResolverConfig::system())
    }

    /// Context resolving names with `config`.
    pub fn with_resolver_config(config: ResolverConfig) -> Self {
        Self {
            inner: zmq::Context::new(),
            resolver: EndpointResolver::new(DnsDirectory::new(config)),
        }
    }

    /// Create an unbound socket of `socket_type`.
    ///
    /// # Errors
    ///
    /// Returns libzmq's error if the socket cannot be created.
    pub fn socket(&self, socket_type: SocketType) -> Result<Socket<ZmqTransport>> {
        let transport = ZmqTransport::new(&self.inner, socket_type)?;
        Ok(Socket::with_resolver(
            socket_type,
            transport,
            self.resolver.clone(),
        ))
    }

    /// Create a socket and bind it to `uri`.
    ///
    /// # Errors
    ///
    /// Returns the creation or bind error.
    pub fn bind(&self, socket_type: SocketType, uri: &str) -> Result<Socket<ZmqTransport>> {
        let mut socket = self.socket(socket_type)?;
        socket.bind(uri)?;
        Ok(socket)
    }

    /// Create a socket and connect it to `uri`.
    ///
    /// # Errors
    ///
    /// Returns the creation or connect error.
    pub fn connect(&self, socket_type: SocketType, uri: &str) -> Result<Socket<ZmqTransport>> {
        let mut socket = self.socket(socket_type)?;
        socket.connect(uri)?;
        Ok(socket)
    }

    /// The raw libzmq context.
    pub fn inner(&self) -> &zmq::Context {
        &self.inner
    }
}
