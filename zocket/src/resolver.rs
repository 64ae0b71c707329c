//! Endpoint resolution through SRV records.
//!
//! Resolution is best-effort: a name that cannot be resolved is used
//! literally, and the reason is reported in the returned [`Resolution`].

use std::net::IpAddr;

use tracing::{debug, warn};
use zocket_core::endpoint::{has_protocol, tcp_endpoint, ServiceName};
use zocket_core::error::ResolutionError;
use zocket_core::service::{select_preferred, ServiceDirectory, ServiceRecord, ServiceRecords};
use zocket_resolv::DnsDirectory;

/// Outcome of resolving an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Input already names a transport protocol; no lookup was made.
    Qualified(String),

    /// A service record was selected.
    Resolved {
        /// Name as given
        name: String,
        /// `tcp://<address>:<port>` of the selected record
        endpoint: String,
    },

    /// Nothing usable was found; the input is used as given.
    Literal {
        /// Name as given, used as the endpoint
        name: String,
        /// Why no record was used
        reason: String,
    },
}

impl Resolution {
    /// The endpoint to hand to the transport.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Qualified(endpoint) | Self::Resolved { endpoint, .. } => endpoint,
            Self::Literal { name, .. } => name,
        }
    }

    /// Consume the resolution, keeping the endpoint.
    pub fn into_endpoint(self) -> String {
        match self {
            Self::Qualified(endpoint) | Self::Resolved { endpoint, .. } => endpoint,
            Self::Literal { name, .. } => name,
        }
    }

    /// True if resolution fell back to the literal input.
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }
}

/// Resolves bare `<service>.<domain>` names to `tcp://host:port` endpoints.
#[derive(Debug, Clone)]
pub struct EndpointResolver<D = DnsDirectory> {
    directory: D,
}

impl Default for EndpointResolver<DnsDirectory> {
    fn default() -> Self {
        Self::new(DnsDirectory::system())
    }
}

impl<D: ServiceDirectory> EndpointResolver<D> {
    /// Resolver querying `directory`.
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// The injected directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Resolve `name` to a single endpoint.
    ///
    /// Qualified endpoints are returned untouched. Otherwise the SRV records
    /// of `_<service>._tcp.<domain>` are fetched and the preferred one (lowest
    /// priority, then highest weight) is turned into `tcp://<address>:<port>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zocket::resolver::{EndpointResolver, Resolution};
    /// use zocket_core::service::ServiceRecord;
    /// use zocket_resolv::StaticDirectory;
    ///
    /// let resolver = EndpointResolver::new(
    ///     StaticDirectory::new().with_service(
    ///         "_collector._tcp.example.com",
    ///         [ServiceRecord::new("10.0.0.2", 9000, 0, 0)],
    ///     ),
    /// );
    /// assert_eq!(
    ///     resolver.resolve("collector.example.com").endpoint(),
    ///     "tcp://10.0.0.2:9000"
    /// );
    /// assert!(matches!(resolver.resolve("tcp://127.0.0.1:9000"), Resolution::Qualified(_)));
    /// ```
    pub fn resolve(&self, name: &str) -> Resolution {
        if has_protocol(name) {
            return Resolution::Qualified(name.to_string());
        }

        match self.try_resolve(name) {
            Ok(Some(endpoint)) => {
                debug!("[Resolver] {} -> {}", name, endpoint);
                Resolution::Resolved {
                    name: name.to_string(),
                    endpoint,
                }
            }
            Ok(None) => {
                debug!("[Resolver] No SRV records for {}, using it as given", name);
                Resolution::Literal {
                    name: name.to_string(),
                    reason: "no service records".to_string(),
                }
            }
            Err(e) => {
                warn!("[Resolver] Cannot resolve {}: {}, using it as given", name, e);
                Resolution::Literal {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_resolve(&self, name: &str) -> Result<Option<String>, ResolutionError> {
        let records = self.resolve_all(name)?;
        let Some(record) = select_preferred(&records) else {
            return Ok(None);
        };
        let addr = self.directory.lookup_host(&record.target)?;
        Ok(Some(tcp_endpoint(&addr.to_string(), record.port)))
    }

    /// Every SRV record published for `name`, in answer order.
    ///
    /// Records with a root (`.`) target mean the service is not offered and
    /// are dropped, so a lone `.` answer yields no records.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a `<service>.<domain>` name or the
    /// directory lookup fails.
    pub fn resolve_all(&self, name: &str) -> Result<ServiceRecords, ResolutionError> {
        let service = ServiceName::parse(name)?;
        let mut records = self.directory.lookup_srv(&service.srv_query())?;
        records.retain(|r| !r.is_unavailable());
        Ok(records)
    }

    /// `tcp://<address>:<port>` for one record.
    ///
    /// If the target has no address the target name itself is used, leaving
    /// name resolution to the transport.
    pub fn record_endpoint(&self, record: &ServiceRecord) -> String {
        match self.directory.lookup_host(&record.target) {
            Ok(addr) => tcp_endpoint(&addr.to_string(), record.port),
            Err(e) => {
                warn!("[Resolver] No address for {}: {}", record.target, e);
                tcp_endpoint(record.target.trim_end_matches('.'), record.port)
            }
        }
    }

    /// Resolve a host name through the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory has no address for `host`.
    pub fn lookup_host(&self, host: &str) -> Result<IpAddr, ResolutionError> {
        self.directory.lookup_host(host)
    }
}
