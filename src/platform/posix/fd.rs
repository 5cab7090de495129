use std::io;
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::time::{Duration, Instant};

use libc::{self, c_int, fcntl, F_DUPFD_CLOEXEC, F_GETFL, F_SETFL, O_NONBLOCK};

/// POSIX file descriptor support for `io` traits.
pub(crate) struct Fd {
    pub(crate) inner: RawFd,
}

impl Fd {
    pub fn new(value: RawFd) -> io::Result<Self> {
        if value < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self::new_uncheck(value))
    }
    pub fn new_uncheck(value: RawFd) -> Self {
        Fd { inner: value }
    }

    /// Duplicate the descriptor; both copies refer to the same open file.
    pub fn try_clone(&self) -> io::Result<Self> {
        Fd::new(unsafe { fcntl(self.inner, F_DUPFD_CLOEXEC, 0) })
    }

    pub fn is_nonblocking(&self) -> io::Result<bool> {
        let flags = unsafe { fcntl(self.inner, F_GETFL) };
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(flags & O_NONBLOCK != 0)
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        let flags = unsafe { fcntl(self.inner, F_GETFL) };
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        let flags = if nonblocking {
            flags | O_NONBLOCK
        } else {
            flags & !O_NONBLOCK
        };
        match unsafe { fcntl(self.inner, F_SETFL, flags) } {
            0 => Ok(()),
            _ => Err(io::Error::last_os_error()),
        }
    }

    #[inline]
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let fd = self.as_raw_fd();
        let amount = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut _, buf.len()) };
        if amount < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(amount as usize)
    }

    #[inline]
    pub fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let fd = self.as_raw_fd();
        let amount = unsafe { libc::write(fd, buf.as_ptr() as *const _, buf.len()) };
        if amount < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(amount as usize)
    }

    /// Block until the descriptor is readable or `timeout` elapses.
    ///
    /// Returns `Ok(false)` on timeout. Hang-up and error conditions count as
    /// readable so that the next `read` reports them. An interrupted wait is
    /// resumed with whatever is left of the original deadline.
    pub fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now().checked_add(timeout);
        let mut remaining = timeout;
        loop {
            let mut pfd = libc::pollfd {
                fd: self.inner,
                events: libc::POLLIN,
                revents: 0,
            };
            let result = unsafe { libc::poll(&mut pfd, 1, poll_timeout_ms(remaining)) };
            if result > 0 {
                if pfd.revents & libc::POLLNVAL != 0 {
                    return Err(io::Error::from_raw_os_error(libc::EBADF));
                }
                return Ok(true);
            }
            if result == 0 {
                return Ok(false);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
            if let Some(deadline) = deadline {
                remaining = deadline.saturating_duration_since(Instant::now());
            }
        }
    }
}

/// Milliseconds for `poll(2)`, rounded up so the wait never ends early.
fn poll_timeout_ms(timeout: Duration) -> c_int {
    let ms = timeout.as_nanos().div_ceil(1_000_000);
    ms.min(c_int::MAX as u128) as c_int
}

impl AsRawFd for Fd {
    fn as_raw_fd(&self) -> RawFd {
        self.inner
    }
}

impl IntoRawFd for Fd {
    fn into_raw_fd(mut self) -> RawFd {
        let fd = self.inner;
        self.inner = -1;
        fd
    }
}

impl Drop for Fd {
    fn drop(&mut self) {
        if self.inner >= 0 {
            unsafe { libc::close(self.inner) };
        }
    }
}
