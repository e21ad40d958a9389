use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::{fmt_payload, IpProtocol};
use std::fmt::{Debug, Formatter};
use std::net::Ipv4Addr;

const VERSION_OFFSET: usize = 0;
const IHL_OFFSET: usize = 0;
const DSCP_OFFSET: usize = 1;
const ECN_OFFSET: usize = 1;
const TOTAL_LENGTH_OFFSET: usize = 2;
const IDENTIFICATION_OFFSET: usize = 4;
const FLAGS_AND_FRAGMENT_OFFSET_OFFSET: usize = 6;
const TIME_TO_LIVE_OFFSET: usize = 8;
const PROTOCOL_OFFSET: usize = 9;
const CHECKSUM_OFFSET: usize = 10;
const SOURCE_OFFSET: usize = 12;
const DESTINATION_OFFSET: usize = 16;

/// Byte offset of the ICMP message within an inbound IPv4 datagram.
///
/// Returns `None` when the buffer cannot hold an IPv4 header followed by an
/// ICMP header, when the version nibble is not 4, when the next layer
/// protocol is not ICMP or when the stated header length overruns the
/// buffer. Callers treat `None` as "discard as unexpected" rather than as an
/// error.
#[must_use]
pub fn icmp_offset(packet: &[u8]) -> Option<usize> {
    const MIN_LENGTH: usize = Ipv4Packet::minimum_packet_size() + 8;
    if packet.len() < MIN_LENGTH {
        return None;
    }
    if packet[VERSION_OFFSET] & 0xf0 != 0x40 {
        return None;
    }
    if packet[PROTOCOL_OFFSET] != IpProtocol::Icmp.id() {
        return None;
    }
    let header_length = usize::from(packet[IHL_OFFSET] & 0x0f) * 4;
    if packet.len() < header_length + 8 {
        return None;
    }
    Some(header_length)
}

/// Represents an IPv4 packet.
///
/// The internal representation is held in network byte order (big-endian) and
/// all accessor methods take and return data in host byte order, converting
/// as necessary for the given architecture.
pub struct Ipv4Packet<'a> {
    buf: Buffer<'a>,
}

impl<'a> Ipv4Packet<'a> {
    pub fn new(packet: &'a mut [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Mutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("Ipv4Packet"),
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
                String::from("Ipv4Packet"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    #[must_use]
    pub const fn minimum_packet_size() -> usize {
        20
    }

    #[must_use]
    pub fn get_version(&self) -> u8 {
        (self.buf.read_u8(VERSION_OFFSET) & 0xf0) >> 4
    }

    #[must_use]
    pub fn get_header_length(&self) -> u8 {
        self.buf.read_u8(IHL_OFFSET) & 0xf
    }

    #[must_use]
    pub fn get_dscp(&self) -> u8 {
        (self.buf.read_u8(DSCP_OFFSET) & 0xfc) >> 2
    }

    #[must_use]
    pub fn get_ecn(&self) -> u8 {
        self.buf.read_u8(ECN_OFFSET) & 0x3
    }

    #[must_use]
    pub fn get_total_length(&self) -> u16 {
        self.buf.read_u16(TOTAL_LENGTH_OFFSET)
    }

    #[must_use]
    pub fn get_identification(&self) -> u16 {
        self.buf.read_u16(IDENTIFICATION_OFFSET)
    }

    #[must_use]
    pub fn get_flags_and_fragment_offset(&self) -> u16 {
        self.buf.read_u16(FLAGS_AND_FRAGMENT_OFFSET_OFFSET)
    }

    #[must_use]
    pub fn get_ttl(&self) -> u8 {
        self.buf.read_u8(TIME_TO_LIVE_OFFSET)
    }

    #[must_use]
    pub fn get_protocol(&self) -> IpProtocol {
        IpProtocol::from(self.buf.read_u8(PROTOCOL_OFFSET))
    }

    #[must_use]
    pub fn get_checksum(&self) -> u16 {
        self.buf.read_u16(CHECKSUM_OFFSET)
    }

    #[must_use]
    pub fn get_source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.buf.read_u32(SOURCE_OFFSET))
    }

    #[must_use]
    pub fn get_destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.buf.read_u32(DESTINATION_OFFSET))
    }

    pub fn set_version(&mut self, val: u8) {
        let value = (self.buf.read_u8(VERSION_OFFSET) & 0xf) | ((val & 0xf) << 4);
        self.buf.write_u8(VERSION_OFFSET, value);
    }

    pub fn set_header_length(&mut self, val: u8) {
        let value = (self.buf.read_u8(IHL_OFFSET) & 0xf0) | (val & 0xf);
        self.buf.write_u8(IHL_OFFSET, value);
    }

    pub fn set_dscp(&mut self, val: u8) {
        let value = (self.buf.read_u8(DSCP_OFFSET) & 0x3) | ((val & 0x3f) << 2);
        self.buf.write_u8(DSCP_OFFSET, value);
    }

    pub fn set_ecn(&mut self, val: u8) {
        let value = (self.buf.read_u8(ECN_OFFSET) & 0xfc) | (val & 0x3);
        self.buf.write_u8(ECN_OFFSET, value);
    }

    pub fn set_total_length(&mut self, val: u16) {
        self.buf.write_u16(TOTAL_LENGTH_OFFSET, val);
    }

    pub fn set_identification(&mut self, val: u16) {
        self.buf.write_u16(IDENTIFICATION_OFFSET, val);
    }

    pub fn set_flags_and_fragment_offset(&mut self, val: u16) {
        self.buf.write_u16(FLAGS_AND_FRAGMENT_OFFSET_OFFSET, val);
    }

    pub fn set_ttl(&mut self, val: u8) {
        self.buf.write_u8(TIME_TO_LIVE_OFFSET, val);
    }

    pub fn set_protocol(&mut self, val: IpProtocol) {
        self.buf.write_u8(PROTOCOL_OFFSET, val.id());
    }

    pub fn set_checksum(&mut self, val: u16) {
        self.buf.write_u16(CHECKSUM_OFFSET, val);
    }

    pub fn set_source(&mut self, val: Ipv4Addr) {
        self.buf.write_u32(SOURCE_OFFSET, u32::from(val));
    }

    pub fn set_destination(&mut self, val: Ipv4Addr) {
        self.buf.write_u32(DESTINATION_OFFSET, u32::from(val));
    }

    pub fn set_payload(&mut self, vals: &[u8]) {
        let current_offset = Self::minimum_packet_size() + self.options_length();
        self.buf.as_slice_mut()[current_offset..current_offset + vals.len()].copy_from_slice(vals);
    }

    #[must_use]
    pub fn packet(&self) -> &[u8] {
        self.buf.as_slice()
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        let start = Self::minimum_packet_size() + self.options_length();
        &self.buf.as_slice()[start..]
    }

    fn options_length(&self) -> usize {
        (usize::from(self.get_header_length()) * 4).saturating_sub(Self::minimum_packet_size())
    }
}

impl Debug for Ipv4Packet<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipv4Packet")
            .field("version", &self.get_version())
            .field("header_length", &self.get_header_length())
            .field("dscp", &self.get_dscp())
            .field("ecn", &self.get_ecn())
            .field("total_length", &self.get_total_length())
            .field("identification", &self.get_identification())
            .field(
                "flags_and_fragment_offset",
                &self.get_flags_and_fragment_offset(),
            )
            .field("ttl", &self.get_ttl())
            .field("protocol", &self.get_protocol())
            .field("checksum", &self.get_checksum())
            .field("source", &self.get_source())
            .field("destination", &self.get_destination())
            .field("payload", &fmt_payload(self.payload()))
            .finish()
    }
}
