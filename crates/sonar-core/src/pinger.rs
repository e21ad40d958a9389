use crate::config::Config;
use crate::constants::{DEFAULT_PAYLOAD, MAX_PACKET_SIZE, SEQUENCE_WINDOW};
use crate::error::Error;
use crate::event::PingEvent;
use crate::net::channel::PingChannel;
use crate::net::socket::Socket;
use crate::types::{PingIdentifier, Sequence};
use sonar_dns::{Resolution, Resolve, ResolveQuery};
use sonar_packet::checksum::icmp_ipv4_checksum;
use sonar_packet::{icmpv4, icmpv6, ipv4};
use std::io;
use std::net::SocketAddr;
use tracing::instrument;

/// The lifecycle state of a ping session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PingerState {
    /// Created but not yet started.
    Idle,
    /// Awaiting host name resolution.
    Resolving,
    /// Resolved and able to send echo requests.
    Active,
    /// Stopped; a new session is required to ping again.
    Stopped,
    /// Stopped after publishing a fatal error.
    Failed,
}

/// An ICMP echo client for a single host.
///
/// A `Pinger` resolves its host to an address of the configured family,
/// opens an ICMP datagram socket of the matching family and exchanges echo
/// request / echo reply packets with the host, publishing a [`PingEvent`]
/// for everything that happens to the consumer-supplied sink.
///
/// The engine is single-threaded and reactive: it performs work only inside
/// [`Pinger::start`], [`Pinger::send_ping`], [`Pinger::stop`] and the
/// driver-invoked [`Pinger::poll`]. Sending cadence is owned by the driver;
/// the engine sends exactly one echo request per `send_ping` call.
pub struct Pinger<S: Socket, R: Resolve, F: FnMut(&PingEvent)> {
    config: Config,
    resolver: R,
    publish: F,
    state: PingerState,
    channel: Option<PingChannel<S>>,
    query: Option<ResolveQuery>,
    next_sequence: Sequence,
    wrapped: bool,
}

impl<S: Socket, R: Resolve, F: FnMut(&PingEvent)> Pinger<S, R, F> {
    /// Create a pinger.
    ///
    /// No traffic is generated and no socket is opened until the session is
    /// started and the host has resolved.
    pub const fn new(config: Config, resolver: R, publish: F) -> Self {
        Self {
            config,
            resolver,
            publish,
            state: PingerState::Idle,
            channel: None,
            query: None,
            next_sequence: Sequence(0),
            wrapped: false,
        }
    }

    /// The lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PingerState {
        self.state
    }

    /// The echo identifier that tags this session's packets.
    #[must_use]
    pub const fn identifier(&self) -> PingIdentifier {
        self.config.identifier
    }

    /// The sequence number the next echo request will carry.
    #[must_use]
    pub const fn next_sequence(&self) -> Sequence {
        self.next_sequence
    }

    /// Whether the sequence counter has rolled over.
    #[must_use]
    pub const fn wrapped(&self) -> bool {
        self.wrapped
    }

    /// The address the session is bound to, once active.
    #[must_use]
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        self.channel.as_ref().map(PingChannel::peer)
    }

    /// Begin resolving the host.
    ///
    /// The session transitions to `Resolving`; the outcome of resolution is
    /// dispatched by a later [`Pinger::poll`].
    ///
    /// # Panics
    ///
    /// Panics if the session is not idle.
    #[instrument(skip(self), level = "trace")]
    pub fn start(&mut self) {
        assert_eq!(
            PingerState::Idle,
            self.state,
            "start on a session that is not idle"
        );
        self.query = Some(
            self.resolver
                .begin_lookup(&self.config.host, self.config.addr_family),
        );
        self.state = PingerState::Resolving;
        tracing::debug!(host = %self.config.host, family = %self.config.addr_family, "resolving");
    }

    /// Drive pending work, waiting at most the configured read timeout.
    ///
    /// While resolving, collects the resolution outcome: on success the
    /// socket is opened, the session becomes `Active` and `Started` is
    /// published; on failure `Failed` is published and the session ends.
    /// While active, waits for socket readability and runs the reply
    /// protocol. In any other state this is a no-op.
    #[instrument(skip(self), level = "trace")]
    pub fn poll(&mut self) {
        match self.state {
            PingerState::Resolving => self.poll_resolution(),
            PingerState::Active => self.poll_socket(),
            PingerState::Idle | PingerState::Stopped | PingerState::Failed => {}
        }
    }

    /// Send one echo request carrying `payload`, or the default filler
    /// payload when `None`.
    ///
    /// The sequence counter advances by exactly one whether or not the send
    /// succeeds, and a send failure leaves the session active.
    ///
    /// # Panics
    ///
    /// Panics if the session is not active.
    #[instrument(skip(self, payload), level = "trace")]
    pub fn send_ping(&mut self, payload: Option<&[u8]>) {
        assert_eq!(
            PingerState::Active,
            self.state,
            "send_ping on a session that is not active"
        );
        let channel = self.channel.as_mut().expect("active session has a channel");
        let sequence = self.next_sequence;
        let payload = payload.unwrap_or(DEFAULT_PAYLOAD);
        let packet = build_echo_request(
            channel.peer().is_ipv4(),
            self.config.identifier,
            sequence,
            payload,
        );
        let outcome = channel.send(&packet);
        let (next, rolled) = sequence.advance();
        self.next_sequence = next;
        self.wrapped |= rolled;
        match outcome {
            Ok(()) => {
                tracing::debug!(%sequence, bytes = packet.len(), "echo request sent");
                (self.publish)(&PingEvent::Sent { sequence, packet });
            }
            Err(error) => {
                tracing::debug!(%sequence, %error, "echo request failed");
                (self.publish)(&PingEvent::SendFailed {
                    sequence,
                    packet,
                    error,
                });
            }
        }
    }

    /// Stop the session, cancelling any pending resolution and closing the
    /// socket. Idempotent; publishes no event.
    #[instrument(skip(self), level = "trace")]
    pub fn stop(&mut self) {
        if matches!(self.state, PingerState::Stopped | PingerState::Failed) {
            return;
        }
        self.teardown();
        self.state = PingerState::Stopped;
        tracing::debug!("session stopped");
    }

    fn poll_resolution(&mut self) {
        let Some(resolution) = self.resolver.poll(self.config.read_timeout) else {
            return;
        };
        let Resolution { query, result } = resolution;
        // Stale or cancelled lookups are discarded.
        if Some(query) != self.query {
            tracing::trace!(?query, "stale resolution discarded");
            return;
        }
        self.query = None;
        match result {
            Ok(addr) => self.activate(SocketAddr::new(addr, 0)),
            Err(err) => self.fail(Error::from(err)),
        }
    }

    fn activate(&mut self, addr: SocketAddr) {
        match PingChannel::open(addr) {
            Ok(channel) => {
                self.channel = Some(channel);
                self.state = PingerState::Active;
                tracing::debug!(%addr, "session active");
                (self.publish)(&PingEvent::Started { addr });
            }
            Err(err) => self.fail(err),
        }
    }

    fn poll_socket(&mut self) {
        let channel = self.channel.as_mut().expect("active session has a channel");
        match channel.is_readable(self.config.read_timeout) {
            Ok(true) => self.read_reply(),
            Ok(false) => {}
            Err(err) => self.fail(Error::IoError(err)),
        }
    }

    /// Read and dispatch one inbound datagram.
    ///
    /// A datagram that fails validation is published as `Unexpected`; any
    /// read error other than `WouldBlock` is fatal to the session.
    fn read_reply(&mut self) {
        let channel = self.channel.as_mut().expect("active session has a channel");
        let peer_is_ipv4 = channel.peer().is_ipv4();
        let mut buf = vec![0_u8; MAX_PACKET_SIZE];
        match channel.recv(&mut buf) {
            Ok((bytes_read, _addr)) => {
                buf.truncate(bytes_read);
                self.dispatch_datagram(peer_is_ipv4, buf);
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(err) => self.fail(Error::IoError(err)),
        }
    }

    fn dispatch_datagram(&mut self, is_ipv4: bool, datagram: Vec<u8>) {
        match self.validate_reply(is_ipv4, &datagram) {
            Some((offset, sequence)) => {
                let packet = datagram[offset..].to_vec();
                tracing::debug!(%sequence, bytes = packet.len(), "echo reply received");
                (self.publish)(&PingEvent::Received { sequence, packet });
            }
            None => {
                tracing::trace!(bytes = datagram.len(), "unexpected packet");
                (self.publish)(&PingEvent::Unexpected { packet: datagram });
            }
        }
    }

    /// Validate an inbound datagram as an echo reply for this session.
    ///
    /// On success returns the byte offset of the ICMP message within the
    /// datagram and the echoed sequence number.
    fn validate_reply(&self, is_ipv4: bool, datagram: &[u8]) -> Option<(usize, Sequence)> {
        if is_ipv4 {
            let offset = ipv4::icmp_offset(datagram)?;
            let icmp = &datagram[offset..];
            let packet = icmpv4::echo::EchoPacket::new_view(icmp).ok()?;
            if icmp_ipv4_checksum(icmp) != packet.get_checksum() {
                return None;
            }
            if packet.get_icmp_type() != icmpv4::IcmpType::EchoReply {
                return None;
            }
            if packet.get_icmp_code() != icmpv4::IcmpCode(0) {
                return None;
            }
            if packet.get_identifier() != self.config.identifier.0 {
                return None;
            }
            let sequence = Sequence(packet.get_sequence());
            self.valid_sequence(sequence).then_some((offset, sequence))
        } else {
            // The kernel has already validated the ICMPv6 checksum.
            let packet = icmpv6::echo::EchoPacket::new_view(datagram).ok()?;
            if packet.get_icmp_type() != icmpv6::IcmpType::EchoReply {
                return None;
            }
            if packet.get_icmp_code() != icmpv6::IcmpCode(0) {
                return None;
            }
            if packet.get_identifier() != self.config.identifier.0 {
                return None;
            }
            let sequence = Sequence(packet.get_sequence());
            self.valid_sequence(sequence).then_some((0, sequence))
        }
    }

    /// Whether a reply sequence number could have been sent by this session.
    ///
    /// Before the counter has wrapped only sequence numbers strictly below
    /// the next outbound sequence are acceptable. Afterwards a reply is
    /// acceptable if its wrapping distance from the next outbound sequence
    /// is within the acceptance window.
    fn valid_sequence(&self, sequence: Sequence) -> bool {
        if self.wrapped {
            self.next_sequence.distance(sequence) < SEQUENCE_WINDOW
        } else {
            sequence < self.next_sequence
        }
    }

    fn fail(&mut self, error: Error) {
        self.teardown();
        self.state = PingerState::Failed;
        tracing::debug!(%error, "session failed");
        (self.publish)(&PingEvent::Failed { error });
    }

    fn teardown(&mut self) {
        if let Some(query) = self.query.take() {
            self.resolver.cancel(query);
        }
        self.channel = None;
    }
}

/// Build an echo request packet.
///
/// The checksum is computed and stored for IPv4; for IPv6 it is left as
/// zero for the kernel to fill from the pseudo-header.
fn build_echo_request(
    is_ipv4: bool,
    identifier: PingIdentifier,
    sequence: Sequence,
    payload: &[u8],
) -> Vec<u8> {
    let mut buf = vec![0_u8; 8 + payload.len()];
    if is_ipv4 {
        let mut packet = icmpv4::echo::EchoPacket::new(&mut buf)
            .expect("buffer holds the minimum packet size");
        packet.set_icmp_type(icmpv4::IcmpType::EchoRequest);
        packet.set_icmp_code(icmpv4::IcmpCode(0));
        packet.set_identifier(identifier.0);
        packet.set_sequence(sequence.0);
        packet.set_payload(payload);
        let checksum = icmp_ipv4_checksum(packet.packet());
        packet.set_checksum(checksum);
    } else {
        let mut packet = icmpv6::echo::EchoPacket::new(&mut buf)
            .expect("buffer holds the minimum packet size");
        packet.set_icmp_type(icmpv6::IcmpType::EchoRequest);
        packet.set_icmp_code(icmpv6::IcmpCode(0));
        packet.set_identifier(identifier.0);
        packet.set_sequence(sequence.0);
        packet.set_payload(payload);
    }
    buf
}
