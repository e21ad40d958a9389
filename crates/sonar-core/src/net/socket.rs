use crate::error::IoResult;
use std::net::SocketAddr;
use std::time::Duration;

/// A non-blocking ICMP datagram socket.
///
/// The transport never interprets packet contents; it moves opaque
/// datagrams between the engine and the wire.
#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create a socket for exchanging ICMP echo packets over IPv4.
    fn new_icmp_dgram_ipv4() -> IoResult<Self>;
    /// Create a socket for exchanging ICMP echo packets over IPv6.
    fn new_icmp_dgram_ipv6() -> IoResult<Self>;
    /// Send a single datagram, returning the number of bytes written.
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<usize>;
    /// Receive a single datagram and the peer address, if known.
    fn recv_from(&mut self, buf: &mut [u8]) -> IoResult<(usize, Option<SocketAddr>)>;
    /// Returns true if the socket becomes readable before the timeout.
    fn is_readable(&mut self, timeout: Duration) -> IoResult<bool>;
}

#[cfg(test)]
pub mod tests {
    /// Serialises tests that set expectations on the `MockSocket` static
    /// constructor contexts.
    pub static MOCKET_MTX: std::sync::Mutex<()> = std::sync::Mutex::new(());
}
