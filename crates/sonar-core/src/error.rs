use std::fmt::{Display, Formatter};
use std::io;
use std::io::ErrorKind;
use std::net::SocketAddr;
use thiserror::Error;

/// A ping error result.
pub type PingResult<T> = Result<T, Error>;

/// A ping error.
///
/// Errors raised while resolving or starting a session are fatal to the
/// session and surface once as a terminal `Failed` event; errors raised
/// while sending surface as a `SendFailed` event and leave the session
/// active.
#[derive(Error, Debug)]
pub enum Error {
    /// The resolver returned no address matching the requested family.
    #[error("host not found: {0}")]
    HostNotFound(String),
    /// The resolver failed for some other reason.
    #[error("resolution failed: {0}")]
    ResolutionFailed(sonar_dns::Error),
    /// A socket syscall failed.
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
}

impl From<sonar_dns::Error> for Error {
    fn from(err: sonar_dns::Error) -> Self {
        match err {
            sonar_dns::Error::HostNotFound(host) => Self::HostNotFound(host),
            err @ sonar_dns::Error::LookupFailed(..) => Self::ResolutionFailed(err),
        }
    }
}

/// Custom IO error result.
pub type IoResult<T> = Result<T, IoError>;

/// Custom IO error.
///
/// Pairs the raw `std::io::Error`, with its OS error code preserved
/// exactly, with the socket operation that failed.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::SendTo(e, _) | Self::Other(e, _) => e.raw_os_error(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SendTo(e, _) | Self::Other(e, _) => e.kind(),
        }
    }
}

/// Io operation.
#[derive(Debug)]
pub enum IoOperation {
    NewSocket,
    SetNonBlocking,
    Poll,
    RecvFrom,
    Startup,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetNonBlocking => write!(f, "set non-blocking"),
            Self::Poll => write!(f, "poll"),
            Self::RecvFrom => write!(f, "recv from"),
            Self::Startup => write!(f, "startup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_error_mapping() {
        let err = Error::from(sonar_dns::Error::HostNotFound(String::from("nohost")));
        assert!(matches!(err, Error::HostNotFound(host) if host == "nohost"));
        let err = Error::from(sonar_dns::Error::LookupFailed(
            String::from("nohost"),
            io::Error::from(ErrorKind::TimedOut),
        ));
        assert!(matches!(err, Error::ResolutionFailed(_)));
    }

    #[test]
    fn test_io_error_preserves_errno() {
        let err = IoError::Other(io::Error::from_raw_os_error(1), IoOperation::RecvFrom);
        assert_eq!(Some(1), err.raw_os_error());
        assert_eq!(ErrorKind::PermissionDenied, err.kind());
        assert!(err.to_string().starts_with("failed to recv from:"));
    }
}
