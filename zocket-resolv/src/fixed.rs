//! In-memory service directory.
//!
//! Answers from fixed tables. Useful for tests and for deployments that pin
//! service locations in configuration rather than DNS.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use zocket_core::error::ResolutionError;
use zocket_core::service::{ServiceDirectory, ServiceRecord, ServiceRecords};

/// Directory backed by fixed SRV and host tables.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    services: HashMap<String, ServiceRecords>,
    hosts: HashMap<String, IpAddr>,
    unreachable: bool,
    srv_queries: AtomicUsize,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose every lookup fails as if no nameserver answered.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Publish `records` under the SRV owner name `query`.
    #[must_use]
    pub fn with_service(
        mut self,
        query: impl Into<String>,
        records: impl IntoIterator<Item = ServiceRecord>,
    ) -> Self {
        self.services
            .insert(query.into(), records.into_iter().collect());
        self
    }

    /// Map a host name to an address.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>, addr: IpAddr) -> Self {
        self.hosts.insert(host.into(), addr);
        self
    }

    /// Number of SRV lookups answered so far.
    pub fn srv_queries(&self) -> usize {
        self.srv_queries.load(Ordering::Relaxed)
    }

    fn unreachable_error(query: &str) -> ResolutionError {
        ResolutionError::Timeout {
            query: query.to_string(),
            timeout: std::time::Duration::ZERO,
        }
    }
}

impl ServiceDirectory for StaticDirectory {
    fn lookup_srv(&self, query: &str) -> Result<ServiceRecords, ResolutionError> {
        self.srv_queries.fetch_add(1, Ordering::Relaxed);
        if self.unreachable {
            return Err(Self::unreachable_error(query));
        }
        Ok(self.services.get(query).cloned().unwrap_or_default())
    }

    fn lookup_host(&self, host: &str) -> Result<IpAddr, ResolutionError> {
        if let Some(addr) = self.hosts.get(host) {
            return Ok(*addr);
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        if self.unreachable {
            return Err(Self::unreachable_error(host));
        }
        Err(ResolutionError::NoAddress(host.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_from_tables() {
        let dir = StaticDirectory::new()
            .with_service(
                "_svc._tcp.example.com",
                [ServiceRecord::new("a.example.com", 1000, 0, 0)],
            )
            .with_host("a.example.com", "10.0.0.1".parse().unwrap());

        let records = dir.lookup_srv("_svc._tcp.example.com").unwrap();
        assert_eq!(records[0].port, 1000);
        assert!(dir.lookup_srv("_other._tcp.example.com").unwrap().is_empty());
        assert_eq!(dir.srv_queries(), 2);
        assert_eq!(
            dir.lookup_host("a.example.com").unwrap(),
            "10.0.0.1".parse::<IpAddr>().unwrap()
        );
        assert!(matches!(
            dir.lookup_host("b.example.com"),
            Err(ResolutionError::NoAddress(_))
        ));
    }

    #[test]
    fn test_unreachable_fails_every_lookup() {
        let dir = StaticDirectory::unreachable();
        assert!(dir.lookup_srv("_svc._tcp.example.com").is_err());
        assert!(dir.lookup_host("a.example.com").is_err());
        assert_eq!(dir.srv_queries(), 1);
    }
}
