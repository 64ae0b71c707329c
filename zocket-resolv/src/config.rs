//! Resolver configuration
//!
//! Controls which nameservers are asked and how long a lookup may block.
//! Every lookup is bounded by `timeout * attempts * nameservers.len()`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use std::{fs, io};

use tracing::debug;

/// Standard DNS port
pub const DNS_PORT: u16 = 53;

/// Default per-attempt timeout (2s)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of attempts per nameserver
pub const DEFAULT_ATTEMPTS: u32 = 2;

/// Largest `timeout:` accepted from resolv.conf
pub const MAX_CONF_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest `attempts:` accepted from resolv.conf
pub const MAX_CONF_ATTEMPTS: u32 = 5;

/// System resolver configuration file
pub const RESOLV_CONF: &str = "/etc/resolv.conf";

/// Resolver configuration.
///
/// # Examples
///
/// ```
/// use zocket_resolv::config::ResolverConfig;
/// use std::time::Duration;
///
/// let config = ResolverConfig::new()
///     .with_nameserver("10.0.0.53:53".parse().unwrap())
///     .with_timeout(Duration::from_millis(500))
///     .with_attempts(3);
/// assert_eq!(config.nameservers.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Nameservers, asked in order
    pub nameservers: Vec<SocketAddr>,

    /// Time to wait for each answer
    pub timeout: Duration,

    /// Attempts per nameserver before moving on
    pub attempts: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nameservers: vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DNS_PORT)],
            timeout: DEFAULT_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl ResolverConfig {
    /// Empty nameserver list with default timeout and attempts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nameservers: Vec::new(),
            ..Self::default()
        }
    }

    /// Configuration from the system's `/etc/resolv.conf`.
    ///
    /// Falls back to `127.0.0.1:53` when the file is missing or lists no
    /// nameservers.
    #[must_use]
    pub fn system() -> Self {
        match Self::from_file(RESOLV_CONF) {
            Ok(config) if !config.nameservers.is_empty() => config,
            Ok(_) => {
                debug!("[Dns] {} lists no nameservers, using localhost", RESOLV_CONF);
                Self::default()
            }
            Err(e) => {
                debug!("[Dns] Cannot read {}: {}, using localhost", RESOLV_CONF, e);
                Self::default()
            }
        }
    }

    /// Parse a resolv.conf-style file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::from_resolv_conf(&contents))
    }

    /// Parse resolv.conf contents.
    ///
    /// Understands `nameserver <ip>` and `options timeout:N attempts:N`.
    /// `timeout` is clamped to 1..=30 seconds and `attempts` to 1..=5.
    /// Unknown directives and malformed values are ignored.
    #[must_use]
    pub fn from_resolv_conf(contents: &str) -> Self {
        let mut config = Self::new();

        for line in contents.lines() {
            let line = line.split(['#', ';']).next().unwrap_or("");
            let mut words = line.split_whitespace();
            match words.next() {
                Some("nameserver") => {
                    if let Some(ip) = words.next().and_then(|w| w.parse::<IpAddr>().ok()) {
                        config.nameservers.push(SocketAddr::new(ip, DNS_PORT));
                    }
                }
                Some("options") => {
                    for opt in words {
                        if let Some(secs) = opt.strip_prefix("timeout:") {
                            if let Ok(secs) = secs.parse::<u64>() {
                                config.timeout =
                                    Duration::from_secs(secs.max(1)).min(MAX_CONF_TIMEOUT);
                            }
                        } else if let Some(n) = opt.strip_prefix("attempts:") {
                            if let Ok(n) = n.parse::<u32>() {
                                config.attempts = n.clamp(1, MAX_CONF_ATTEMPTS);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        config
    }

    /// Append a nameserver.
    #[must_use]
    pub fn with_nameserver(mut self, addr: SocketAddr) -> Self {
        self.nameservers.push(addr);
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set attempts per nameserver (at least one).
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Upper bound on how long one query may block, saturating at
    /// [`Duration::MAX`].
    pub fn max_lookup_time(&self) -> Duration {
        let servers = u32::try_from(self.nameservers.len()).unwrap_or(u32::MAX);
        self.timeout
            .saturating_mul(self.attempts)
            .saturating_mul(servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolv_conf() {
        let config = ResolverConfig::from_resolv_conf(
            "# generated\n\
             search corp.example.com\n\
             nameserver 10.0.0.53\n\
             nameserver ::1 # local\n\
             nameserver bogus\n\
             options ndots:2 timeout:3 attempts:4\n",
        );
        assert_eq!(
            config.nameservers,
            vec![
                "10.0.0.53:53".parse::<SocketAddr>().unwrap(),
                "[::1]:53".parse::<SocketAddr>().unwrap(),
            ]
        );
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.attempts, 4);
    }

    #[test]
    fn test_parse_empty_keeps_defaults() {
        let config = ResolverConfig::from_resolv_conf("");
        assert!(config.nameservers.is_empty());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.attempts, DEFAULT_ATTEMPTS);
    }

    #[test]
    fn test_default_is_localhost() {
        let config = ResolverConfig::default();
        assert_eq!(config.nameservers, vec!["127.0.0.1:53".parse().unwrap()]);
    }

    #[test]
    fn test_builder_and_bound() {
        let config = ResolverConfig::new()
            .with_nameserver("10.0.0.1:53".parse().unwrap())
            .with_nameserver("10.0.0.2:53".parse().unwrap())
            .with_timeout(Duration::from_millis(250))
            .with_attempts(0);
        assert_eq!(config.attempts, 1);
        assert_eq!(config.max_lookup_time(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_clamps_options() {
        let config = ResolverConfig::from_resolv_conf(
            "nameserver 10.0.0.53\n\
             options timeout:18446744073709551615 attempts:100\n",
        );
        assert_eq!(config.timeout, MAX_CONF_TIMEOUT);
        assert_eq!(config.attempts, MAX_CONF_ATTEMPTS);

        let config = ResolverConfig::from_resolv_conf("options timeout:0 attempts:0\n");
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.attempts, 1);
    }

    #[test]
    fn test_lookup_bound_saturates() {
        let config = ResolverConfig::new()
            .with_nameserver("10.0.0.1:53".parse().unwrap())
            .with_nameserver("10.0.0.2:53".parse().unwrap())
            .with_timeout(Duration::MAX)
            .with_attempts(u32::MAX);
        assert_eq!(config.max_lookup_time(), Duration::MAX);
    }
}
