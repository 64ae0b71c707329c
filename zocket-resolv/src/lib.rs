//! # Zocket Resolv
//!
//! Service directories for zocket endpoint resolution.
//!
//! - [`DnsDirectory`]: SRV and address lookups over UDP against the
//!   configured nameservers, bounded by [`ResolverConfig`] timeouts
//! - [`StaticDirectory`]: fixed in-memory tables
//!
//! ```rust,no_run
//! use zocket_core::service::ServiceDirectory;
//! use zocket_resolv::{DnsDirectory, ResolverConfig};
//! use std::time::Duration;
//!
//! let dns = DnsDirectory::new(ResolverConfig::system().with_timeout(Duration::from_secs(1)));
//! let records = dns.lookup_srv("_collector._tcp.example.com")?;
//! # Ok::<(), zocket_core::error::ResolutionError>(())
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod fixed;
pub mod wire;

pub use client::DnsDirectory;
pub use config::ResolverConfig;
pub use fixed::StaticDirectory;
