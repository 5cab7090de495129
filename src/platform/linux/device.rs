use crate::builder::DeviceConfig;
use crate::error::{Error, Result};
use crate::platform::linux::ifreq::{IfReq, TunFlags};
use crate::platform::linux::sys::*;
use crate::platform::posix::Fd;
use libc::{O_CLOEXEC, O_RDWR};
use std::ffi::CString;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, RawFd};
use std::time::Duration;

/// A TUN device using the TUN/TAP Linux driver.
pub struct Device {
    pub(crate) fd: Fd,
    flags: TunFlags,
}

impl Device {
    /// Open the control device and attach it to the interface in `config`.
    pub(crate) fn new(config: DeviceConfig) -> Result<Self> {
        let mut flags = TunFlags::TUN;
        if !config.packet_information {
            flags |= TunFlags::NO_PI;
        }
        // Validate before anything reaches the kernel.
        let mut req = IfReq::new(config.dev_name.as_bytes(), flags)?;

        let fd = unsafe { libc::open(c"/dev/net/tun".as_ptr(), O_RDWR | O_CLOEXEC) };
        let tun_fd = Fd::new(fd).map_err(Error::from_open)?;
        if let Err(err) = unsafe { tunsetiff(tun_fd.inner, &mut req as *mut _ as *mut _) } {
            let err = io::Error::from(err);
            log::warn!("TUNSETIFF {:?} rejected: {err}", config.dev_name);
            return Err(Error::DeviceConfiguration(err));
        }
        let device = Device { fd: tun_fd, flags };
        log::debug!(
            "attached tun device {:?} (flags {:?})",
            device.name().unwrap_or_default(),
            flags
        );
        Ok(device)
    }

    /// # Safety
    /// The fd passed in must be an owned file descriptor; in particular, it must be open.
    pub(crate) unsafe fn from_fd(fd: RawFd) -> Self {
        Device {
            fd: Fd::new_uncheck(fd),
            flags: TunFlags::empty(),
        }
    }

    /// Flags the device was attached with; empty for adopted descriptors.
    pub fn flags(&self) -> TunFlags {
        self.flags
    }

    /// Interface name as reported by the kernel.
    pub fn name(&self) -> io::Result<String> {
        let mut req = IfReq::zeroed();
        unsafe { tungetiff(self.as_raw_fd(), &mut req as *mut _ as *mut _) }?;
        Ok(req.name())
    }

    pub fn if_index(&self) -> io::Result<u32> {
        let if_name = CString::new(self.name()?)?;
        match unsafe { libc::if_nametoindex(if_name.as_ptr()) } {
            0 => Err(io::Error::last_os_error()),
            index => Ok(index),
        }
    }

    /// Keep (or stop keeping) the interface after this handle is closed.
    pub fn persist(&self, value: bool) -> io::Result<()> {
        unsafe { tunsetpersist(self.as_raw_fd(), value as _) }?;
        Ok(())
    }

    /// A second handle on the same queue.
    pub fn try_clone(&self) -> io::Result<Device> {
        Ok(Device {
            fd: self.fd.try_clone()?,
            flags: self.flags,
        })
    }

    pub fn is_nonblocking(&self) -> io::Result<bool> {
        self.fd.is_nonblocking()
    }
    /// Moves this Device into or out of nonblocking mode.
    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        self.fd.set_nonblocking(nonblocking)
    }

    /// Recv a packet from tun device
    pub(crate) fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.fd.read(buf)
    }

    /// Send a packet to tun device
    pub(crate) fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.fd.write(buf)
    }

    pub(crate) fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        self.fd.wait_readable(timeout)
    }
}

impl AsRawFd for Device {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl AsFd for Device {
    fn as_fd(&self) -> BorrowedFd<'_> {
        unsafe { BorrowedFd::borrow_raw(self.as_raw_fd()) }
    }
}

impl IntoRawFd for Device {
    fn into_raw_fd(self) -> RawFd {
        self.fd.into_raw_fd()
    }
}
