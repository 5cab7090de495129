use std::io;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// `/dev/net/tun` is missing or the caller may not open it.
    #[error("tun control device unavailable: {0}")]
    PermissionOrNotFound(#[source] io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The kernel refused `TUNSETIFF`, e.g. a name collision or missing `CAP_NET_ADMIN`.
    #[error("tun device configuration rejected: {0}")]
    DeviceConfiguration(#[source] io::Error),

    #[error("timed out waiting for the device to become readable")]
    TimedOut,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify a failure to open the control device node.
    pub(crate) fn from_open(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(libc::ENOENT | libc::ENODEV | libc::ENXIO | libc::EACCES | libc::EPERM) => {
                Self::PermissionOrNotFound(err)
            }
            _ => Self::Io(err),
        }
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::InvalidArgument(err)
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::Io(err) | Error::PermissionOrNotFound(err) => err,
            Error::TimedOut => io::Error::from(io::ErrorKind::TimedOut),
            Error::InvalidArgument(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            err @ Error::DeviceConfiguration(_) => io::Error::new(io::ErrorKind::Other, err),
        }
    }
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn open_errors_are_classified() {
        let missing = Error::from_open(io::Error::from_raw_os_error(libc::ENOENT));
        assert!(matches!(missing, Error::PermissionOrNotFound(_)));
        let denied = Error::from_open(io::Error::from_raw_os_error(libc::EACCES));
        assert!(matches!(denied, Error::PermissionOrNotFound(_)));
        let other = Error::from_open(io::Error::from_raw_os_error(libc::EMFILE));
        assert!(matches!(other, Error::Io(_)));
    }

    #[test]
    fn into_io_error_keeps_kind() {
        let err: io::Error = Error::TimedOut.into();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        let err: io::Error = Error::from("name too long").into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err: io::Error =
            Error::PermissionOrNotFound(io::Error::from_raw_os_error(libc::EACCES)).into();
        assert_eq!(err.raw_os_error(), Some(libc::EACCES));
    }
}
