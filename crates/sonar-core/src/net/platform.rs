use crate::error::{IoError, IoOperation, IoResult};
use crate::net::socket::Socket;
use itertools::Itertools;
use nix::poll::{PollFd, PollFlags, PollTimeout};
use socket2::{Domain, Protocol, SockAddr, Type};
use std::io;
use std::net::SocketAddr;
use std::os::fd::AsFd;
use std::time::Duration;
use tracing::instrument;

/// An ICMP datagram socket.
///
/// Uses `SOCK_DGRAM` with `IPPROTO_ICMP` / `IPPROTO_ICMPV6` rather than a
/// raw socket, which is the portable choice on platforms that restrict raw
/// ICMP to privileged processes.
pub struct SocketImpl {
    inner: socket2::Socket,
}

impl SocketImpl {
    fn new(domain: Domain, protocol: Protocol) -> IoResult<Self> {
        let inner = socket2::Socket::new(domain, Type::DGRAM, Some(protocol))
            .map_err(|err| IoError::Other(err, IoOperation::NewSocket))?;
        inner
            .set_nonblocking(true)
            .map_err(|err| IoError::Other(err, IoOperation::SetNonBlocking))?;
        Ok(Self { inner })
    }
}

impl Socket for SocketImpl {
    #[instrument(level = "trace")]
    fn new_icmp_dgram_ipv4() -> IoResult<Self> {
        Self::new(Domain::IPV4, Protocol::ICMPV4)
    }

    #[instrument(level = "trace")]
    fn new_icmp_dgram_ipv6() -> IoResult<Self> {
        Self::new(Domain::IPV6, Protocol::ICMPV6)
    }

    #[instrument(skip(self, buf), level = "trace")]
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<usize> {
        tracing::trace!(buf = format!("{:02x?}", buf.iter().format(" ")), ?addr);
        self.inner
            .send_to(buf, &SockAddr::from(addr))
            .map_err(|err| IoError::SendTo(err, addr))
    }

    #[instrument(skip(self, buf), level = "trace")]
    fn recv_from(&mut self, buf: &mut [u8]) -> IoResult<(usize, Option<SocketAddr>)> {
        let (bytes_read, addr) = self
            .inner
            .recv_from_into_buf(buf)
            .map_err(|err| IoError::Other(err, IoOperation::RecvFrom))?;
        tracing::trace!(
            buf = format!("{:02x?}", buf[..bytes_read].iter().format(" ")),
            bytes_read,
            ?addr
        );
        Ok((bytes_read, addr))
    }

    #[instrument(skip(self), level = "trace")]
    fn is_readable(&mut self, timeout: Duration) -> IoResult<bool> {
        let mut fds = [PollFd::new(self.inner.as_fd(), PollFlags::POLLIN)];
        let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let timeout = PollTimeout::try_from(millis).unwrap_or(PollTimeout::MAX);
        match nix::poll::poll(&mut fds, timeout) {
            Ok(readable) => Ok(readable == 1),
            Err(nix::errno::Errno::EINTR) => Ok(false),
            Err(err) => Err(IoError::Other(io::Error::from(err), IoOperation::Poll)),
        }
    }
}

/// Adapts `socket2::Socket::recv_from` to a plain `&mut [u8]` buffer.
///
/// `socket2` only exposes `recv_from` over `&mut [MaybeUninit<u8>]`
/// (rust-lang/socket2#223), while the engine always supplies an
/// already-initialised receive buffer.
trait RecvFrom {
    fn recv_from_into_buf(&self, buf: &mut [u8]) -> io::Result<(usize, Option<SocketAddr>)>;
}

impl RecvFrom for socket2::Socket {
    // Safety: `recv(2)` only ever overwrites bytes in the buffer, so an
    // initialised `[u8]` may be viewed as `[MaybeUninit<u8>]` for the
    // duration of the call without any byte being de-initialised.
    #![allow(unsafe_code)]
    fn recv_from_into_buf(&self, buf: &mut [u8]) -> io::Result<(usize, Option<SocketAddr>)> {
        let buf = unsafe {
            &mut *(std::ptr::from_mut::<[u8]>(buf) as *mut [std::mem::MaybeUninit<u8>])
        };
        self.recv_from(buf)
            .map(|(size, addr)| (size, addr.as_socket()))
    }
}
