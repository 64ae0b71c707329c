//! UDP stub resolver.
//!
//! Sends one question per datagram to each configured nameserver in turn,
//! waiting at most `timeout` per attempt. Replies with a mismatched ID are
//! ignored until the attempt's deadline. A truncated reply is repeated over
//! TCP to the same nameserver; if that fails the lookup fails, so a partial
//! answer is never used.

use std::io::{self, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, UdpSocket};
use std::time::Instant;

use bytes::{BufMut, BytesMut};
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, trace};
use zocket_core::error::ResolutionError;
use zocket_core::service::{ServiceDirectory, ServiceRecords};

use crate::config::ResolverConfig;
use crate::wire::{self, DnsResponse, RecordData, RecordType, MAX_UDP_PAYLOAD, RCODE_NXDOMAIN};

/// Service directory backed by DNS.
#[derive(Debug, Clone)]
pub struct DnsDirectory {
    config: ResolverConfig,
}

impl Default for DnsDirectory {
    fn default() -> Self {
        Self::system()
    }
}

impl DnsDirectory {
    /// Directory querying the nameservers in `config`.
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Directory using the nameservers from `/etc/resolv.conf`.
    pub fn system() -> Self {
        Self::new(ResolverConfig::system())
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Ask the configured nameservers for `name`.
    ///
    /// NXDOMAIN is returned as a successful response with no answers.
    ///
    /// # Errors
    ///
    /// Returns an error if no nameserver answers in time, a socket operation
    /// fails on every nameserver, or the answer carries a failure code.
    pub fn query(&self, name: &str, rtype: RecordType) -> Result<DnsResponse, ResolutionError> {
        if self.config.nameservers.is_empty() {
            return Err(ResolutionError::NoNameservers);
        }

        let id: u16 = rand::random();
        let packet = wire::encode_query(id, name, rtype)
            .map_err(|e| ResolutionError::InvalidName(e.to_string()))?;

        let mut last_io: Option<io::Error> = None;
        for server in &self.config.nameservers {
            for attempt in 1..=self.config.attempts {
                trace!("[Dns] {} {:?} -> {} (attempt {})", name, rtype, server, attempt);
                match self.exchange(*server, &packet, id) {
                    Ok(Some(response)) if response.truncated => {
                        debug!("[Dns] {} truncated by {}, retrying over TCP", name, server);
                        return match self.exchange_tcp(*server, &packet, id) {
                            Ok(response) => Self::check(name, response),
                            Err(e) => {
                                debug!("[Dns] TCP retry of {} on {} failed: {}", name, server, e);
                                Err(ResolutionError::Truncated(name.to_string()))
                            }
                        };
                    }
                    Ok(Some(response)) => return Self::check(name, response),
                    Ok(None) => trace!("[Dns] {} timed out on {}", name, server),
                    Err(e) => {
                        debug!("[Dns] {} failed on {}: {}", name, server, e);
                        last_io = Some(e);
                        break;
                    }
                }
            }
        }

        Err(match last_io {
            Some(e) => ResolutionError::Io(e),
            None => ResolutionError::Timeout {
                query: name.to_string(),
                timeout: self.config.max_lookup_time(),
            },
        })
    }

    fn check(name: &str, response: DnsResponse) -> Result<DnsResponse, ResolutionError> {
        match response.rcode {
            0 | RCODE_NXDOMAIN => {}
            rcode => {
                return Err(ResolutionError::ResponseCode {
                    query: name.to_string(),
                    rcode,
                })
            }
        }
        if response.truncated {
            return Err(ResolutionError::Truncated(name.to_string()));
        }
        Ok(response)
    }

    /// One request/response round trip. `Ok(None)` means the attempt timed out.
    fn exchange(
        &self,
        server: SocketAddr,
        packet: &[u8],
        id: u16,
    ) -> io::Result<Option<DnsResponse>> {
        let socket = Socket::new(Domain::for_address(server), Type::DGRAM, Some(Protocol::UDP))?;
        let local: SocketAddr = match server {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        socket.bind(&local.into())?;
        socket.connect(&server.into())?;
        let socket: UdpSocket = socket.into();

        socket.send(packet)?;

        let deadline = Instant::now() + self.config.timeout;
        let mut buf = [0u8; MAX_UDP_PAYLOAD];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            socket.set_read_timeout(Some(remaining))?;

            let n = match socket.recv(&mut buf) {
                Ok(n) => n,
                Err(e)
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    return Ok(None)
                }
                Err(e) => return Err(e),
            };

            match wire::decode_response(&buf[..n]) {
                Ok(response) if response.id == id => {
                    trace!("[Dns] {} answers from {}", response.answers.len(), server);
                    return Ok(Some(response));
                }
                Ok(response) => trace!("[Dns] Ignoring reply with id {}", response.id),
                Err(e) => trace!("[Dns] Ignoring undecodable reply: {}", e),
            }
        }
    }

    /// Repeat `packet` over TCP with the two-byte length prefix.
    ///
    /// Connect and every read/write are bounded by the per-attempt timeout.
    fn exchange_tcp(&self, server: SocketAddr, packet: &[u8], id: u16) -> io::Result<DnsResponse> {
        let len = u16::try_from(packet.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "query too large"))?;

        let socket = Socket::new(Domain::for_address(server), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_nodelay(true)?;
        socket.connect_timeout(&server.into(), self.config.timeout)?;
        let mut stream: TcpStream = socket.into();
        stream.set_read_timeout(Some(self.config.timeout))?;
        stream.set_write_timeout(Some(self.config.timeout))?;

        let mut framed = BytesMut::with_capacity(packet.len() + 2);
        framed.put_u16(len);
        framed.put_slice(packet);
        stream.write_all(&framed)?;

        let mut prefix = [0u8; 2];
        stream.read_exact(&mut prefix)?;
        let mut msg = vec![0u8; usize::from(u16::from_be_bytes(prefix))];
        stream.read_exact(&mut msg)?;

        let response = wire::decode_response(&msg)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if response.id != id {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("reply id {} does not match query id {}", response.id, id),
            ));
        }
        trace!("[Dns] {} answers from {} over TCP", response.answers.len(), server);
        Ok(response)
    }

    fn first_address(
        &self,
        host: &str,
        rtype: RecordType,
    ) -> Result<Option<IpAddr>, ResolutionError> {
        let response = self.query(host, rtype)?;
        Ok(response.answers.iter().find_map(|r| match r {
            RecordData::A(v4) => Some(IpAddr::V4(*v4)),
            RecordData::Aaaa(v6) => Some(IpAddr::V6(*v6)),
            _ => None,
        }))
    }
}

impl ServiceDirectory for DnsDirectory {
    fn lookup_srv(&self, query: &str) -> Result<ServiceRecords, ResolutionError> {
        let response = self.query(query, RecordType::Srv)?;
        let records: ServiceRecords = response
            .srv_records()
            .filter(|srv| !srv.is_unavailable())
            .cloned()
            .collect();
        debug!("[Dns] {} -> {} SRV records", query, records.len());
        Ok(records)
    }

    fn lookup_host(&self, host: &str) -> Result<IpAddr, ResolutionError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        if let Some(ip) = self.first_address(host, RecordType::A)? {
            return Ok(ip);
        }
        self.first_address(host, RecordType::Aaaa)?
            .ok_or_else(|| ResolutionError::NoAddress(host.to_string()))
    }
}
