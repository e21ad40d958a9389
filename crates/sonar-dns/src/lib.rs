//! This crate provides a cheaply cloneable, non-blocking forward DNS
//! resolver with address family filtering.
//!
//! Lookups are enqueued with [`Resolve::begin_lookup`] and never block the
//! calling thread; the system resolver runs on a background worker and each
//! completion is collected with [`Resolve::poll`]. A pending lookup may be
//! cancelled at any time, in which case its completion is never delivered.
//!
//! # Example
//!
//! The following example resolves a host name to an IPv4 address and loops
//! until the lookup completes or fails.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use sonar_dns::{DnsResolver, IpAddrFamily, Resolve};
//! use std::time::Duration;
//!
//! let resolver = DnsResolver::start()?;
//! let query = resolver.begin_lookup("example.com", IpAddrFamily::Ipv4Only);
//! loop {
//!     if let Some(resolution) = resolver.poll(Duration::from_millis(50)) {
//!         assert_eq!(query, resolution.query);
//!         println!("{:?}", resolution.result);
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod resolver;
mod system;

pub use resolver::{Error, IpAddrFamily, Resolution, Resolve, ResolveQuery, Result};
pub use system::DnsResolver;
