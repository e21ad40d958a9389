use crate::config::{defaults, Config};
use crate::error::{Error, IoError, IoOperation, PingResult};
use crate::event::PingEvent;
use crate::net::platform::SocketImpl;
use crate::pinger::Pinger;
use crate::types::PingIdentifier;
use sonar_dns::{DnsResolver, IpAddrFamily};
use std::time::Duration;

/// A builder for creating instances of [`Pinger`].
///
/// # Examples
///
/// Basic usage:
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use sonar_core::{Builder, IpAddrFamily};
///
/// let pinger = Builder::new("example.com")
///     .addr_family(IpAddrFamily::Ipv4Only)
///     .build(|event| println!("{event:?}"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Builder {
    host: String,
    addr_family: IpAddrFamily,
    identifier: Option<PingIdentifier>,
    read_timeout: Duration,
}

impl Builder {
    /// Initialize a new `Builder` for a given host name or literal address.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            addr_family: defaults::DEFAULT_ADDR_FAMILY,
            identifier: None,
            read_timeout: defaults::DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the address family the host is resolved against.
    #[must_use]
    pub fn addr_family(mut self, addr_family: IpAddrFamily) -> Self {
        self.addr_family = addr_family;
        self
    }

    /// Set the echo identifier instead of choosing one at random.
    #[must_use]
    pub fn identifier(mut self, identifier: PingIdentifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Set the longest a single `poll` may wait for readiness.
    #[must_use]
    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Build the `Pinger`, publishing events to `publish`.
    pub fn build<F: FnMut(&PingEvent)>(
        self,
        publish: F,
    ) -> PingResult<Pinger<SocketImpl, DnsResolver, F>> {
        let resolver = DnsResolver::start()
            .map_err(|err| Error::IoError(IoError::Other(err, IoOperation::Startup)))?;
        let config = Config {
            host: self.host,
            addr_family: self.addr_family,
            identifier: self
                .identifier
                .unwrap_or_else(|| PingIdentifier(rand::random())),
            read_timeout: self.read_timeout,
        };
        Ok(Pinger::new(config, resolver, publish))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinger::PingerState;
    use crate::types::Sequence;

    #[test]
    fn test_build_with_defaults() {
        let pinger = Builder::new("127.0.0.1").build(|_| {}).unwrap();
        assert_eq!(PingerState::Idle, pinger.state());
        assert_eq!(Sequence(0), pinger.next_sequence());
        assert!(!pinger.wrapped());
        assert_eq!(None, pinger.bound_addr());
    }

    #[test]
    fn test_build_with_identifier() {
        let pinger = Builder::new("127.0.0.1")
            .identifier(PingIdentifier(7))
            .read_timeout(Duration::from_millis(1))
            .build(|_| {})
            .unwrap();
        assert_eq!(PingIdentifier(7), pinger.identifier());
    }
}
