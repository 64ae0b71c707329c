//! Endpoint addressing.
//!
//! An endpoint passed to bind/connect is either transport-qualified
//! (`tcp://…`, `ipc://…`, `inproc://…`, `pgm://…`, `epgm://…`) or a bare
//! `<service>.<domain>` name that is resolved through SRV records first.

use std::fmt;
use std::net::IpAddr;

use crate::error::ResolutionError;

/// Transport protocols recognised at the start of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// In-process transport: `inproc://name`
    Inproc,
    /// IPC transport (Unix domain socket): `ipc:///path/to/socket`
    Ipc,
    /// TCP transport: `tcp://host:port`
    Tcp,
    /// Reliable multicast: `pgm://iface;group:port`
    Pgm,
    /// Encapsulated reliable multicast over UDP: `epgm://iface;group:port`
    Epgm,
}

impl Protocol {
    const ALL: [Protocol; 5] = [
        Self::Inproc,
        Self::Ipc,
        Self::Tcp,
        Self::Pgm,
        Self::Epgm,
    ];

    /// Scheme name without the `://` separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inproc => "inproc",
            Self::Ipc => "ipc",
            Self::Tcp => "tcp",
            Self::Pgm => "pgm",
            Self::Epgm => "epgm",
        }
    }

    /// Detect the protocol an endpoint starts with.
    ///
    /// Matching is case-insensitive and anchored at the start of the string.
    ///
    /// # Examples
    ///
    /// ```
    /// use zocket_core::endpoint::Protocol;
    ///
    /// assert_eq!(Protocol::detect("tcp://127.0.0.1:5555"), Some(Protocol::Tcp));
    /// assert_eq!(Protocol::detect("EPGM://eth0;239.192.1.1:5555"), Some(Protocol::Epgm));
    /// assert_eq!(Protocol::detect("collector.example.com"), None);
    /// ```
    pub fn detect(endpoint: &str) -> Option<Protocol> {
        let (scheme, _) = endpoint.split_once("://")?;
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(scheme))
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `endpoint` already names a transport protocol.
#[inline]
pub fn has_protocol(endpoint: &str) -> bool {
    Protocol::detect(endpoint).is_some()
}

/// Build a `tcp://host:port` endpoint.
///
/// IPv6 literals are bracketed as the transport expects.
pub fn tcp_endpoint(host: &str, port: u16) -> String {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => format!("tcp://[{v6}]:{port}"),
        _ => format!("tcp://{host}:{port}"),
    }
}

/// A bare `<service>.<domain>` name subject to SRV resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceName {
    service: String,
    domain: String,
}

impl ServiceName {
    /// Split `name` at its first dot into service and domain.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InvalidName`] when either part is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use zocket_core::endpoint::ServiceName;
    ///
    /// let name = ServiceName::parse("collector.example.com").unwrap();
    /// assert_eq!(name.srv_query(), "_collector._tcp.example.com");
    /// ```
    pub fn parse(name: &str) -> Result<Self, ResolutionError> {
        match name.split_once('.') {
            Some((service, domain)) if !service.is_empty() && !domain.is_empty() => Ok(Self {
                service: service.to_string(),
                domain: domain.trim_end_matches('.').to_string(),
            }),
            _ => Err(ResolutionError::InvalidName(name.to_string())),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The SRV owner name to query: `_<service>._tcp.<domain>`.
    pub fn srv_query(&self) -> String {
        format!("_{}._tcp.{}", self.service, self.domain)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.domain)
    }
}
