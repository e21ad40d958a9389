use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

/// A host name resolver.
///
/// Lookups complete asynchronously: `begin_lookup` enqueues without
/// blocking and `poll` collects completions as they become available.
pub trait Resolve {
    /// Enqueue a forward lookup of `hostname` filtered by `family`.
    fn begin_lookup(&self, hostname: &str, family: IpAddrFamily) -> ResolveQuery;

    /// Cancel a pending lookup.
    ///
    /// Idempotent; the completion of a cancelled lookup is never delivered.
    fn cancel(&self, query: ResolveQuery);

    /// Collect the next completion, waiting at most `timeout`.
    fn poll(&self, timeout: Duration) -> Option<Resolution>;
}

/// A DNS resolver error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A DNS resolver error.
#[derive(Error, Debug)]
pub enum Error {
    /// The lookup succeeded but returned no address of an acceptable family.
    #[error("host not found: {0}")]
    HostNotFound(String),
    /// The lookup itself failed.
    #[error("lookup of {0} failed: {1}")]
    LookupFailed(String, #[source] std::io::Error),
}

/// Which address families a lookup accepts.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IpAddrFamily {
    /// Accept the first IPv4 or IPv6 address.
    Any,
    /// Accept IPv4 only.
    Ipv4Only,
    /// Accept IPv6 only.
    Ipv6Only,
}

impl IpAddrFamily {
    /// Whether `addr` belongs to an acceptable family.
    #[must_use]
    pub const fn accepts(self, addr: IpAddr) -> bool {
        matches!(
            (self, addr),
            (Self::Any, _) | (Self::Ipv4Only, IpAddr::V4(_)) | (Self::Ipv6Only, IpAddr::V6(_))
        )
    }
}

impl Display for IpAddrFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::Ipv4Only => write!(f, "Ipv4Only"),
            Self::Ipv6Only => write!(f, "Ipv6Only"),
        }
    }
}

/// Identifies one in-flight lookup.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ResolveQuery(pub u64);

/// The completion of one lookup.
#[derive(Debug)]
pub struct Resolution {
    /// The lookup this completion belongs to.
    pub query: ResolveQuery,
    /// The first address of an acceptable family, in system resolver order.
    pub result: Result<IpAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use test_case::test_case;

    const V4: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    const V6: IpAddr = IpAddr::V6(Ipv6Addr::LOCALHOST);

    #[test_case(IpAddrFamily::Any, V4, true; "any accepts v4")]
    #[test_case(IpAddrFamily::Any, V6, true; "any accepts v6")]
    #[test_case(IpAddrFamily::Ipv4Only, V4, true; "v4 only accepts v4")]
    #[test_case(IpAddrFamily::Ipv4Only, V6, false; "v4 only rejects v6")]
    #[test_case(IpAddrFamily::Ipv6Only, V6, true; "v6 only accepts v6")]
    #[test_case(IpAddrFamily::Ipv6Only, V4, false; "v6 only rejects v4")]
    fn test_accepts(family: IpAddrFamily, addr: IpAddr, expected: bool) {
        assert_eq!(expected, family.accepts(addr));
    }

    #[test]
    fn test_display() {
        assert_eq!("Any", format!("{}", IpAddrFamily::Any));
        assert_eq!("Ipv4Only", format!("{}", IpAddrFamily::Ipv4Only));
        assert_eq!("Ipv6Only", format!("{}", IpAddrFamily::Ipv6Only));
    }
}
