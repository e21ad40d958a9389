use crate::error::{Error, IoError, IoResult, PingResult};
use crate::net::socket::Socket;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::instrument;

/// A channel for exchanging ICMP echo packets with one peer.
///
/// The channel owns the socket for the lifetime of a session and never
/// interprets packet contents.
#[derive(Debug)]
pub struct PingChannel<S: Socket> {
    socket: S,
    peer: SocketAddr,
}

impl<S: Socket> PingChannel<S> {
    /// Open an ICMP datagram socket matching the family of `peer`.
    #[instrument(level = "trace")]
    pub fn open(peer: SocketAddr) -> PingResult<Self> {
        let socket = match peer {
            SocketAddr::V4(_) => S::new_icmp_dgram_ipv4(),
            SocketAddr::V6(_) => S::new_icmp_dgram_ipv6(),
        }?;
        Ok(Self { socket, peer })
    }

    /// The peer address this channel sends to.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Send one datagram to the peer; a short write counts as failure.
    pub fn send(&mut self, buf: &[u8]) -> PingResult<()> {
        let sent = self.socket.send_to(buf, self.peer)?;
        if sent == buf.len() {
            Ok(())
        } else {
            Err(Error::IoError(IoError::SendTo(
                io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("sent {sent} of {} bytes", buf.len()),
                ),
                self.peer,
            )))
        }
    }

    /// Receive one datagram, up to the size of `buf`.
    pub fn recv(&mut self, buf: &mut [u8]) -> IoResult<(usize, Option<SocketAddr>)> {
        self.socket.recv_from(buf)
    }

    /// Returns true if a datagram is ready to be received before the timeout.
    pub fn is_readable(&mut self, timeout: Duration) -> IoResult<bool> {
        self.socket.is_readable(timeout)
    }

    #[cfg(test)]
    pub(crate) const fn from_parts(socket: S, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoOperation;
    use crate::net::socket::tests::MOCKET_MTX;
    use crate::net::socket::MockSocket;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    fn v4_peer() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 0)
    }

    #[test]
    fn test_open_picks_family_constructor() {
        let _guard = MOCKET_MTX.lock().unwrap();
        let ctx_v4 = MockSocket::new_icmp_dgram_ipv4_context();
        ctx_v4.expect().times(1).returning(|| Ok(MockSocket::new()));
        let channel: PingChannel<MockSocket> = PingChannel::open(v4_peer()).unwrap();
        assert_eq!(v4_peer(), channel.peer());

        let ctx_v6 = MockSocket::new_icmp_dgram_ipv6_context();
        ctx_v6.expect().times(1).returning(|| Ok(MockSocket::new()));
        let peer = SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 0);
        let channel: PingChannel<MockSocket> = PingChannel::open(peer).unwrap();
        assert_eq!(peer, channel.peer());
    }

    #[test]
    fn test_open_propagates_socket_error() {
        let _guard = MOCKET_MTX.lock().unwrap();
        let ctx = MockSocket::new_icmp_dgram_ipv4_context();
        ctx.expect().times(1).returning(|| {
            Err(IoError::Other(
                io::Error::from(io::ErrorKind::PermissionDenied),
                IoOperation::NewSocket,
            ))
        });
        let err = PingChannel::<MockSocket>::open(v4_peer()).unwrap_err();
        assert!(matches!(err, Error::IoError(IoError::Other(_, _))));
    }

    #[test]
    fn test_send_full_write() {
        let mut socket = MockSocket::new();
        socket
            .expect_send_to()
            .times(1)
            .returning(|buf, _| Ok(buf.len()));
        let mut channel = PingChannel::from_parts(socket, v4_peer());
        channel.send(&[0_u8; 64]).unwrap();
    }

    #[test]
    fn test_send_short_write_is_failure() {
        let mut socket = MockSocket::new();
        socket
            .expect_send_to()
            .times(1)
            .returning(|buf, _| Ok(buf.len() - 1));
        let mut channel = PingChannel::from_parts(socket, v4_peer());
        let err = channel.send(&[0_u8; 64]).unwrap_err();
        match err {
            Error::IoError(err) => assert_eq!(io::ErrorKind::WriteZero, err.kind()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
