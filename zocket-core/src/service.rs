//! Service records and the directory seam used for endpoint resolution.

use std::net::IpAddr;

use smallvec::SmallVec;

use crate::error::ResolutionError;

/// A single SRV answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Host providing the service
    pub target: String,
    pub port: u16,
    /// Lower is preferred
    pub priority: u16,
    /// Breaks ties between records of equal priority; higher is preferred
    pub weight: u16,
}

impl ServiceRecord {
    pub fn new(target: impl Into<String>, port: u16, priority: u16, weight: u16) -> Self {
        Self {
            target: target.into(),
            port,
            priority,
            weight,
        }
    }

    /// True for a root (`.`) target: the service is decidedly not offered
    /// under this name.
    pub fn is_unavailable(&self) -> bool {
        self.target.is_empty() || self.target == "."
    }
}

/// Records returned by one lookup, in answer order.
pub type ServiceRecords = SmallVec<[ServiceRecord; 4]>;

/// Pick the preferred record: lowest priority, then highest weight.
///
/// Equal weights within the best priority tier resolve to the earliest
/// record in answer order.
///
/// # Examples
///
/// ```
/// use zocket_core::service::{select_preferred, ServiceRecord};
///
/// let records = [
///     ServiceRecord::new("a", 1, 10, 5),
///     ServiceRecord::new("b", 2, 10, 20),
///     ServiceRecord::new("c", 3, 20, 100),
/// ];
/// assert_eq!(select_preferred(&records).unwrap().target, "b");
/// ```
pub fn select_preferred(records: &[ServiceRecord]) -> Option<&ServiceRecord> {
    records
        .iter()
        .min_by_key(|r| (r.priority, std::cmp::Reverse(r.weight)))
}

/// A directory that answers SRV and host address queries.
///
/// Injected into the endpoint resolver so lookups can be replaced with test
/// doubles or fixed tables.
pub trait ServiceDirectory {
    /// Return the SRV records published under `query` (e.g.
    /// `_collector._tcp.example.com`). A name with no records yields an
    /// empty list, not an error.
    fn lookup_srv(&self, query: &str) -> Result<ServiceRecords, ResolutionError>;

    /// Resolve `host` to one address.
    fn lookup_host(&self, host: &str) -> Result<IpAddr, ResolutionError>;
}

impl<D: ServiceDirectory + ?Sized> ServiceDirectory for &D {
    fn lookup_srv(&self, query: &str) -> Result<ServiceRecords, ResolutionError> {
        (**self).lookup_srv(query)
    }

    fn lookup_host(&self, host: &str) -> Result<IpAddr, ResolutionError> {
        (**self).lookup_host(host)
    }
}

impl<D: ServiceDirectory + ?Sized> ServiceDirectory for Box<D> {
    fn lookup_srv(&self, query: &str) -> Result<ServiceRecords, ResolutionError> {
        (**self).lookup_srv(query)
    }

    fn lookup_host(&self, host: &str) -> Result<IpAddr, ResolutionError> {
        (**self).lookup_host(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(target: &str, priority: u16, weight: u16) -> ServiceRecord {
        ServiceRecord::new(target, 9000, priority, weight)
    }

    #[test]
    fn test_lowest_priority_tier_then_highest_weight() {
        let records = [rec("a", 10, 5), rec("b", 10, 20), rec("c", 20, 100)];
        assert_eq!(select_preferred(&records).unwrap().target, "b");
    }

    #[test]
    fn test_priority_beats_weight() {
        let records = [rec("heavy", 5, 1000), rec("light", 1, 0)];
        assert_eq!(select_preferred(&records).unwrap().target, "light");
    }

    #[test]
    fn test_equal_weights_pick_first_in_answer_order() {
        let records = [rec("c", 20, 1), rec("a", 10, 7), rec("b", 10, 7)];
        assert_eq!(select_preferred(&records).unwrap().target, "a");
    }

    #[test]
    fn test_root_target_is_unavailable() {
        assert!(rec(".", 0, 0).is_unavailable());
        assert!(rec("", 0, 0).is_unavailable());
        assert!(!rec("a.example.com.", 0, 0).is_unavailable());
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(select_preferred(&[rec("only", 3, 0)]).unwrap().target, "only");
        assert!(select_preferred(&[]).is_none());
    }
}
