use crate::error::Error;
use crate::types::Sequence;
use std::net::SocketAddr;

/// An event in the life of one ping session.
///
/// Events for a session are delivered to the sink in the order they occur in
/// the engine: `Started` is always first (if any event is delivered at all),
/// `Failed` is always last, and the `Sent` for a sequence number always
/// precedes a `Received` for the same sequence number.
#[derive(Debug)]
pub enum PingEvent {
    /// The session resolved its target and is ready to send.
    Started {
        /// The address the session is bound to.
        addr: SocketAddr,
    },
    /// An echo request was sent.
    Sent {
        /// The sequence number the request carried.
        sequence: Sequence,
        /// The echo request as sent on the wire.
        packet: Vec<u8>,
    },
    /// An echo request could not be sent; the session remains active.
    SendFailed {
        /// The sequence number the request carried.
        sequence: Sequence,
        /// The echo request that could not be sent.
        packet: Vec<u8>,
        /// The send error.
        error: Error,
    },
    /// A validated echo reply arrived.
    Received {
        /// The sequence number echoed back.
        sequence: Sequence,
        /// The ICMP message, with any IPv4 header already stripped.
        packet: Vec<u8>,
    },
    /// An inbound datagram did not validate as a reply to this session.
    Unexpected {
        /// The datagram as received from the socket.
        packet: Vec<u8>,
    },
    /// The session failed; no further events follow.
    Failed {
        /// The fatal error.
        error: Error,
    },
}
