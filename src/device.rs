use crate::error::{Error, Result};
use crate::platform::Device;
use crate::DeviceBuilder;
use bytes::{Bytes, BytesMut};
use std::io::{self, Read, Write};
use std::ops::Deref;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, RawFd};
use std::time::Duration;

/// Attach the TUN interface `name` without packet information and return
/// a handle for raw network-layer packets.
///
/// Names longer than 15 bytes fail with [`Error::InvalidArgument`] before
/// `/dev/net/tun` is opened. The interface exists until the handle is
/// dropped (unless made persistent).
pub fn open_tun(name: &str) -> Result<TunHandle> {
    DeviceBuilder::new().name(name).build_sync()
}

/// Wait up to `timeout` for `handle` to become readable, then read once.
///
/// See [`TunHandle::read_with_timeout`].
pub fn read_with_timeout(handle: &TunHandle, max_bytes: usize, timeout: Duration) -> Result<Bytes> {
    handle.read_with_timeout(max_bytes, timeout)
}

#[repr(transparent)]
pub struct TunHandle(pub(crate) Device);

impl TunHandle {
    /// # Safety
    /// The fd passed in must be an owned file descriptor; in particular, it must be open and valid.
    pub unsafe fn from_fd(fd: RawFd) -> Self {
        TunHandle(Device::from_fd(fd))
    }
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.recv(buf)
    }
    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.0.send(buf)
    }

    /// Wait for readiness, then perform exactly one read into `buf`.
    ///
    /// Fails with [`Error::TimedOut`] without reading if nothing arrives in
    /// time. `Ok(0)` means the interface was closed; an empty `buf` is
    /// rejected with [`Error::InvalidArgument`] so that it can't be mistaken
    /// for closure.
    pub fn recv_timeout(&self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if buf.is_empty() {
            return Err("read buffer must not be empty".into());
        }
        if !self.0.wait_readable(timeout)? {
            log::trace!("no packet within {timeout:?}");
            return Err(Error::TimedOut);
        }
        let len = self.0.recv(buf)?;
        log::trace!("read {len} bytes");
        Ok(len)
    }

    /// Like [`recv_timeout`](Self::recv_timeout) but returns a fresh buffer
    /// of at most `max_bytes` bytes. An empty buffer means closure.
    pub fn read_with_timeout(&self, max_bytes: usize, timeout: Duration) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(max_bytes);
        let len = self.recv_timeout(&mut buf, timeout)?;
        buf.truncate(len);
        Ok(buf.freeze())
    }

    pub fn try_clone(&self) -> io::Result<TunHandle> {
        Ok(TunHandle(self.0.try_clone()?))
    }

    /// A [`Read`] view of this handle that gives up after `timeout`.
    pub fn timeout_reader(&self, timeout: Duration) -> TimeoutReader<'_> {
        TimeoutReader {
            handle: self,
            timeout,
        }
    }
}

impl Deref for TunHandle {
    type Target = Device;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Debug for TunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunHandle")
            .field("fd", &self.as_raw_fd())
            .field("flags", &self.flags())
            .finish()
    }
}

impl Read for TunHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv(buf)
    }
}

impl Write for TunHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.send(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for &TunHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv(buf)
    }
}

impl Write for &TunHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.send(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl AsRawFd for TunHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.0.as_raw_fd()
    }
}

impl AsFd for TunHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl IntoRawFd for TunHandle {
    fn into_raw_fd(self) -> RawFd {
        self.0.into_raw_fd()
    }
}

impl FromRawFd for TunHandle {
    unsafe fn from_raw_fd(fd: RawFd) -> Self {
        TunHandle::from_fd(fd)
    }
}

/// Reads from a [`TunHandle`], failing with [`io::ErrorKind::TimedOut`]
/// when no packet arrives within the timeout.
///
/// Handy for draining whatever the kernel has queued:
///
/// ```no_run
/// # use std::io::Read;
/// # use std::time::Duration;
/// # fn drain(dev: &tun_probe::TunHandle) {
/// let mut reader = dev.timeout_reader(Duration::from_millis(100));
/// let mut buf = [0u8; 1500];
/// while let Ok(n) = reader.read(&mut buf) {
///     println!("stale {:02x?}", &buf[..n]);
/// }
/// # }
/// ```
pub struct TimeoutReader<'a> {
    handle: &'a TunHandle,
    timeout: Duration,
}

impl TimeoutReader<'_> {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

impl Read for TimeoutReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        Ok(self.handle.recv_timeout(buf, self.timeout)?)
    }
}
