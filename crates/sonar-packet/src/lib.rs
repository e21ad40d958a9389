//! Wire format parsing and building for ICMP echo packets.
//!
//! The following packets are supported:
//! - `ICMPv4` echo request / echo reply
//! - `ICMPv6` echo request / echo reply
//! - `IPv4` (as delivered by the kernel ahead of an inbound `ICMPv4` message)
//!
//! # Endianness
//!
//! The internal representation is held in network byte order (big-endian) and
//! all accessor methods take and return data in host byte order, converting as
//! necessary for the given architecture.
//!
//! # Example
//!
//! The following example builds an `ICMPv4` echo request packet:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use sonar_packet::checksum::icmp_ipv4_checksum;
//! use sonar_packet::icmpv4::echo::EchoPacket;
//! use sonar_packet::icmpv4::{IcmpCode, IcmpType};
//!
//! let mut buf = [0; EchoPacket::minimum_packet_size()];
//! let mut echo = EchoPacket::new(&mut buf)?;
//! echo.set_icmp_type(IcmpType::EchoRequest);
//! echo.set_icmp_code(IcmpCode(0));
//! echo.set_identifier(1234);
//! echo.set_sequence(10);
//! echo.set_checksum(icmp_ipv4_checksum(echo.packet()));
//! assert_eq!(echo.packet(), &hex_literal::hex!("08 00 f3 23 04 d2 00 0a"));
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod buffer;

/// Packet errors.
pub mod error;

/// Functions for calculating network checksums.
pub mod checksum;

/// `ICMPv4` packets.
pub mod icmpv4;

/// `ICMPv6` packets.
pub mod icmpv6;

/// `IPv4` packets.
pub mod ipv4;

/// The IP packet next layer protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpProtocol {
    Icmp,
    IcmpV6,
    Other(u8),
}

impl IpProtocol {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::IcmpV6 => 58,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(id: u8) -> Self {
        match id {
            1 => Self::Icmp,
            58 => Self::IcmpV6,
            p => Self::Other(p),
        }
    }
}

/// Format a payload as a hexadecimal string.
#[must_use]
pub fn fmt_payload(bytes: &[u8]) -> String {
    use itertools::Itertools as _;
    format!("{:02x}", bytes.iter().format(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_protocol() {
        assert_eq!(1, IpProtocol::Icmp.id());
        assert_eq!(58, IpProtocol::IcmpV6.id());
        assert_eq!(17, IpProtocol::Other(17).id());
        assert_eq!(IpProtocol::Icmp, IpProtocol::from(1));
        assert_eq!(IpProtocol::IcmpV6, IpProtocol::from(58));
        assert_eq!(IpProtocol::Other(6), IpProtocol::from(6));
    }

    #[test]
    fn test_fmt_payload() {
        assert_eq!("", fmt_payload(&[]));
        assert_eq!("00 ff 0a", fmt_payload(&[0x00, 0xff, 0x0a]));
    }
}
