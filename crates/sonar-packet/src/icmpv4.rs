/// The type of an `ICMPv4` packet.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum IcmpType {
    EchoRequest,
    EchoReply,
    Other(u8),
}

impl IcmpType {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::EchoRequest => 8,
            Self::EchoReply => 0,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IcmpType {
    fn from(val: u8) -> Self {
        match val {
            8 => Self::EchoRequest,
            0 => Self::EchoReply,
            id => Self::Other(id),
        }
    }
}

/// The `ICMPv4` code.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct IcmpCode(pub u8);

impl From<u8> for IcmpCode {
    fn from(val: u8) -> Self {
        Self(val)
    }
}

pub mod echo {
    use crate::buffer::Buffer;
    use crate::error::{Error, Result};
    use crate::fmt_payload;
    use crate::icmpv4::{IcmpCode, IcmpType};
    use std::fmt::{Debug, Formatter};

    const TYPE_OFFSET: usize = 0;
    const CODE_OFFSET: usize = 1;
    const CHECKSUM_OFFSET: usize = 2;
    const IDENTIFIER_OFFSET: usize = 4;
    const SEQUENCE_OFFSET: usize = 6;

    /// Represents an `ICMPv4` echo packet.
    ///
    /// Echo requests and echo replies share a single wire layout and differ
    /// only in the `type` field, so a single view serves both.
    ///
    /// The internal representation is held in network byte order (big-endian)
    /// and all accessor methods take and return data in host byte order,
    /// converting as necessary for the given architecture.
    pub struct EchoPacket<'a> {
        buf: Buffer<'a>,
    }

    impl<'a> EchoPacket<'a> {
        pub fn new(packet: &'a mut [u8]) -> Result<Self> {
            if packet.len() >= Self::minimum_packet_size() {
                Ok(Self {
                    buf: Buffer::Mutable(packet),
                })
            } else {
                Err(Error::InsufficientPacketBuffer(
                    String::from("EchoPacket"),
                    Self::minimum_packet_size(),
                    packet.len(),
                ))
            }
        }

        pub fn new_view(packet: &'a [u8]) -> Result<Self> {
            if packet.len() >= Self::minimum_packet_size() {
                Ok(Self {
                    buf: Buffer::Immutable(packet),
                })
            } else {
                Err(Error::InsufficientPacketBuffer(
                    String::from("EchoPacket"),
                    Self::minimum_packet_size(),
                    packet.len(),
                ))
            }
        }

        #[must_use]
        pub const fn minimum_packet_size() -> usize {
            8
        }

        #[must_use]
        pub fn get_icmp_type(&self) -> IcmpType {
            IcmpType::from(self.buf.read_u8(TYPE_OFFSET))
        }

        #[must_use]
        pub fn get_icmp_code(&self) -> IcmpCode {
            IcmpCode::from(self.buf.read_u8(CODE_OFFSET))
        }

        #[must_use]
        pub fn get_checksum(&self) -> u16 {
            self.buf.read_u16(CHECKSUM_OFFSET)
        }

        #[must_use]
        pub fn get_identifier(&self) -> u16 {
            self.buf.read_u16(IDENTIFIER_OFFSET)
        }

        #[must_use]
        pub fn get_sequence(&self) -> u16 {
            self.buf.read_u16(SEQUENCE_OFFSET)
        }

        pub fn set_icmp_type(&mut self, val: IcmpType) {
            self.buf.write_u8(TYPE_OFFSET, val.id());
        }

        pub fn set_icmp_code(&mut self, val: IcmpCode) {
            self.buf.write_u8(CODE_OFFSET, val.0);
        }

        pub fn set_checksum(&mut self, val: u16) {
            self.buf.write_u16(CHECKSUM_OFFSET, val);
        }

        pub fn set_identifier(&mut self, val: u16) {
            self.buf.write_u16(IDENTIFIER_OFFSET, val);
        }

        pub fn set_sequence(&mut self, val: u16) {
            self.buf.write_u16(SEQUENCE_OFFSET, val);
        }

        pub fn set_payload(&mut self, vals: &[u8]) {
            let current_offset = Self::minimum_packet_size();
            self.buf.as_slice_mut()[current_offset..current_offset + vals.len()]
                .copy_from_slice(vals);
        }

        #[must_use]
        pub fn packet(&self) -> &[u8] {
            self.buf.as_slice()
        }

        #[must_use]
        pub fn payload(&self) -> &[u8] {
            &self.buf.as_slice()[Self::minimum_packet_size()..]
        }
    }

    impl Debug for EchoPacket<'_> {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("EchoPacket")
                .field("icmp_type", &self.get_icmp_type())
                .field("icmp_code", &self.get_icmp_code())
                .field("checksum", &self.get_checksum())
                .field("identifier", &self.get_identifier())
                .field("sequence", &self.get_sequence())
                .field("payload", &fmt_payload(self.payload()))
                .finish()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::checksum::icmp_ipv4_checksum;
        use test_case::test_case;

        #[test]
        fn test_icmp_type() {
            let mut buf = [0_u8; EchoPacket::minimum_packet_size()];
            let mut packet = EchoPacket::new(&mut buf).unwrap();
            packet.set_icmp_type(IcmpType::EchoRequest);
            assert_eq!(IcmpType::EchoRequest, packet.get_icmp_type());
            assert_eq!([0x08], packet.packet()[0..1]);
            packet.set_icmp_type(IcmpType::EchoReply);
            assert_eq!(IcmpType::EchoReply, packet.get_icmp_type());
            assert_eq!([0x00], packet.packet()[0..1]);
            packet.set_icmp_type(IcmpType::Other(255));
            assert_eq!(IcmpType::Other(255), packet.get_icmp_type());
            assert_eq!([0xFF], packet.packet()[0..1]);
        }

        #[test]
        fn test_icmp_code() {
            let mut buf = [0_u8; EchoPacket::minimum_packet_size()];
            let mut packet = EchoPacket::new(&mut buf).unwrap();
            packet.set_icmp_code(IcmpCode(0));
            assert_eq!(IcmpCode(0), packet.get_icmp_code());
            assert_eq!([0x00], packet.packet()[1..2]);
            packet.set_icmp_code(IcmpCode(5));
            assert_eq!(IcmpCode(5), packet.get_icmp_code());
            assert_eq!([0x05], packet.packet()[1..2]);
        }

        #[test]
        fn test_checksum() {
            let mut buf = [0_u8; EchoPacket::minimum_packet_size()];
            let mut packet = EchoPacket::new(&mut buf).unwrap();
            packet.set_checksum(1999);
            assert_eq!(1999, packet.get_checksum());
            assert_eq!([0x07, 0xCF], packet.packet()[2..=3]);
            packet.set_checksum(u16::MAX);
            assert_eq!(u16::MAX, packet.get_checksum());
            assert_eq!([0xFF, 0xFF], packet.packet()[2..=3]);
        }

        #[test]
        fn test_identifier() {
            let mut buf = [0_u8; EchoPacket::minimum_packet_size()];
            let mut packet = EchoPacket::new(&mut buf).unwrap();
            packet.set_identifier(1999);
            assert_eq!(1999, packet.get_identifier());
            assert_eq!([0x07, 0xCF], packet.packet()[4..=5]);
        }

        #[test]
        fn test_sequence() {
            let mut buf = [0_u8; EchoPacket::minimum_packet_size()];
            let mut packet = EchoPacket::new(&mut buf).unwrap();
            packet.set_sequence(1999);
            assert_eq!(1999, packet.get_sequence());
            assert_eq!([0x07, 0xCF], packet.packet()[6..=7]);
        }

        #[test]
        fn test_build_echo_request() {
            let payload = b"ABCDEFGH";
            let mut buf = [0_u8; EchoPacket::minimum_packet_size() + 8];
            let mut packet = EchoPacket::new(&mut buf).unwrap();
            packet.set_icmp_type(IcmpType::EchoRequest);
            packet.set_icmp_code(IcmpCode(0));
            packet.set_identifier(0x1234);
            packet.set_sequence(0x0001);
            packet.set_payload(payload);
            let checksum = icmp_ipv4_checksum(packet.packet());
            packet.set_checksum(checksum);
            assert_eq!(
                &hex_literal::hex!("08 00 d4 b5 12 34 00 01 41 42 43 44 45 46 47 48"),
                packet.packet()
            );
        }

        #[test_case(IcmpType::EchoRequest, 0x1234, 0x0001, &b"ABCDEFGH"[..]; "request")]
        #[test_case(IcmpType::EchoReply, 0xffff, 0xffff, &b""[..]; "reply no payload")]
        #[test_case(IcmpType::EchoReply, 0x0000, 0x8000, &[0xde, 0xad, 0xbe][..]; "odd payload")]
        fn test_roundtrip(icmp_type: IcmpType, identifier: u16, sequence: u16, payload: &[u8]) {
            let mut buf = vec![0_u8; EchoPacket::minimum_packet_size() + payload.len()];
            let mut packet = EchoPacket::new(&mut buf).unwrap();
            packet.set_icmp_type(icmp_type);
            packet.set_icmp_code(IcmpCode(0));
            packet.set_identifier(identifier);
            packet.set_sequence(sequence);
            packet.set_payload(payload);
            let checksum = icmp_ipv4_checksum(packet.packet());
            packet.set_checksum(checksum);
            let parsed = EchoPacket::new_view(&buf).unwrap();
            assert_eq!(icmp_type, parsed.get_icmp_type());
            assert_eq!(IcmpCode(0), parsed.get_icmp_code());
            assert_eq!(identifier, parsed.get_identifier());
            assert_eq!(sequence, parsed.get_sequence());
            assert_eq!(payload, parsed.payload());
            assert_eq!(checksum, icmp_ipv4_checksum(parsed.packet()));
        }

        #[test]
        fn test_view() {
            let buf = hex_literal::hex!("00 00 dc b6 12 34 00 00 41 42 43 44 45 46 47 48");
            let packet = EchoPacket::new_view(&buf).unwrap();
            assert_eq!(IcmpType::EchoReply, packet.get_icmp_type());
            assert_eq!(IcmpCode(0), packet.get_icmp_code());
            assert_eq!(0xdcb6, packet.get_checksum());
            assert_eq!(0x1234, packet.get_identifier());
            assert_eq!(0x0000, packet.get_sequence());
            assert_eq!(b"ABCDEFGH", packet.payload());
        }

        #[test]
        fn test_new_insufficient_buffer() {
            const SIZE: usize = EchoPacket::minimum_packet_size();
            let mut buf = [0_u8; SIZE - 1];
            let err = EchoPacket::new(&mut buf).unwrap_err();
            assert_eq!(
                Error::InsufficientPacketBuffer(String::from("EchoPacket"), SIZE, SIZE - 1),
                err
            );
        }

        #[test]
        fn test_new_view_insufficient_buffer() {
            const SIZE: usize = EchoPacket::minimum_packet_size();
            let buf = [0_u8; SIZE - 1];
            let err = EchoPacket::new_view(&buf).unwrap_err();
            assert_eq!(
                Error::InsufficientPacketBuffer(String::from("EchoPacket"), SIZE, SIZE - 1),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icmp_type_id() {
        assert_eq!(8, IcmpType::EchoRequest.id());
        assert_eq!(0, IcmpType::EchoReply.id());
        assert_eq!(11, IcmpType::Other(11).id());
        assert_eq!(IcmpType::EchoRequest, IcmpType::from(8));
        assert_eq!(IcmpType::EchoReply, IcmpType::from(0));
        assert_eq!(IcmpType::Other(3), IcmpType::from(3));
    }
}
