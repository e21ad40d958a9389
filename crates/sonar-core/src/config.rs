use crate::types::PingIdentifier;
use sonar_dns::IpAddrFamily;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use sonar_dns::IpAddrFamily;
    use std::time::Duration;

    /// The default value for `addr-family`.
    pub const DEFAULT_ADDR_FAMILY: IpAddrFamily = IpAddrFamily::Any;

    /// The default value for `read-timeout`.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);
}

/// Configuration for a `Pinger`.
#[derive(Debug, Clone)]
pub struct Config {
    /// The host name or literal IP address to ping.
    pub host: String,
    /// The address family the host is resolved against.
    pub addr_family: IpAddrFamily,
    /// The echo identifier that tags this session's packets.
    pub identifier: PingIdentifier,
    /// The longest a single `poll` may wait for readiness.
    pub read_timeout: Duration,
}

impl Config {
    /// Create a `Config` for a host with a random identifier and default
    /// settings.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            addr_family: defaults::DEFAULT_ADDR_FAMILY,
            identifier: PingIdentifier(rand::random()),
            read_timeout: defaults::DEFAULT_READ_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::new("example.com");
        assert_eq!("example.com", config.host);
        assert_eq!(IpAddrFamily::Any, config.addr_family);
        assert_eq!(Duration::from_millis(10), config.read_timeout);
    }
}
