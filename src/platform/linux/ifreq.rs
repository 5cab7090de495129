//! The request block handed to `TUNSETIFF`/`TUNGETIFF`.
//!
//! Only the head of the kernel's `struct ifreq` is meaningful to the TUN
//! driver: the interface name followed by the `ifr_flags` word. The rest
//! of the 40-byte block is reserved and must be zero.

use byteorder::{ByteOrder, NativeEndian};
use libc::{c_short, IFNAMSIZ};
use std::mem;

use crate::error::{Error, Result};

/// Size of the reserved tail after the flags word.
pub const IFREQ_RESERVED: usize = 22;
/// Total size of the request block.
pub const IFREQ_LEN: usize = IFNAMSIZ + mem::size_of::<c_short>() + IFREQ_RESERVED;
/// Longest usable interface name; the last byte of the name field is the NUL.
pub const MAX_NAME_LEN: usize = IFNAMSIZ - 1;

bitflags::bitflags! {
    /// Flags word of a TUN/TAP request.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct TunFlags: c_short {
        /// Network-layer device.
        const TUN = libc::IFF_TUN as c_short;
        /// Link-layer device.
        const TAP = libc::IFF_TAP as c_short;
        /// Exchange bare frames without the 4-byte packet information header.
        const NO_PI = libc::IFF_NO_PI as c_short;
        const MULTI_QUEUE = libc::IFF_MULTI_QUEUE as c_short;
    }
}

#[repr(C)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IfReq {
    name: [u8; IFNAMSIZ],
    flags: c_short,
    reserved: [u8; IFREQ_RESERVED],
}

const _: () = assert!(mem::size_of::<IfReq>() == IFREQ_LEN);

impl IfReq {
    /// Build a request for `name` with the given mode flags.
    ///
    /// An empty name lets the kernel choose one (`tun0`, `tun1`, ...).
    pub fn new(name: &[u8], flags: TunFlags) -> Result<Self> {
        let name = encode_name(name)?;
        Ok(IfReq {
            name,
            flags: flags.bits(),
            reserved: [0; IFREQ_RESERVED],
        })
    }

    /// An all-zero block for the kernel to fill in.
    pub(crate) fn zeroed() -> Self {
        IfReq {
            name: [0; IFNAMSIZ],
            flags: 0,
            reserved: [0; IFREQ_RESERVED],
        }
    }

    /// The interface name up to the first NUL.
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(IFNAMSIZ);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    pub fn flags(&self) -> TunFlags {
        TunFlags::from_bits_retain(self.flags)
    }

    /// The block exactly as the kernel reads it.
    pub fn as_bytes(&self) -> [u8; IFREQ_LEN] {
        let mut out = [0u8; IFREQ_LEN];
        out[..IFNAMSIZ].copy_from_slice(&self.name);
        NativeEndian::write_i16(&mut out[IFNAMSIZ..IFNAMSIZ + 2], self.flags);
        out[IFNAMSIZ + 2..].copy_from_slice(&self.reserved);
        out
    }
}

fn encode_name(name: &[u8]) -> Result<[u8; IFNAMSIZ]> {
    if name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidArgument(format!(
            "device name is {} bytes, at most {MAX_NAME_LEN} allowed",
            name.len()
        )));
    }
    if name.contains(&0) {
        return Err(Error::InvalidArgument(
            "device name contains a NUL byte".into(),
        ));
    }
    let mut out = [0u8; IFNAMSIZ];
    out[..name.len()].copy_from_slice(name);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout() {
        assert_eq!(IFREQ_LEN, 40);
        assert_eq!(mem::size_of::<IfReq>(), 40);
        assert_eq!(mem::offset_of!(IfReq, flags), 16);
        assert_eq!(mem::offset_of!(IfReq, reserved), 18);
    }

    #[test]
    fn name_is_zero_padded() {
        for name in ["", "t", "tun0", "probe-iface-015"] {
            let req = IfReq::new(name.as_bytes(), TunFlags::TUN | TunFlags::NO_PI).unwrap();
            let bytes = req.as_bytes();
            assert_eq!(&bytes[..name.len()], name.as_bytes());
            assert!(bytes[name.len()..16].iter().all(|&b| b == 0));
            assert_eq!(req.name(), name);
        }
    }

    #[test]
    fn flags_in_native_order() {
        let req = IfReq::new(b"tun0", TunFlags::TUN | TunFlags::NO_PI).unwrap();
        let bytes = req.as_bytes();
        let expected = ((libc::IFF_TUN | libc::IFF_NO_PI) as c_short).to_ne_bytes();
        assert_eq!(&bytes[16..18], &expected);
        assert_eq!(i16::from_ne_bytes([bytes[16], bytes[17]]), 0x1001);
        assert!(bytes[18..].iter().all(|&b| b == 0));
        assert_eq!(req.flags(), TunFlags::TUN | TunFlags::NO_PI);
    }

    #[test]
    fn in_memory_block_matches_bytes() {
        let req = IfReq::new(b"tun7", TunFlags::TUN).unwrap();
        let raw: [u8; IFREQ_LEN] = unsafe { mem::transmute(req.clone()) };
        assert_eq!(raw, req.as_bytes());
    }

    #[test]
    fn rejects_long_names() {
        assert!(IfReq::new(&[b'a'; MAX_NAME_LEN], TunFlags::TUN).is_ok());
        for len in [16, 17, 64] {
            let err = IfReq::new(&vec![b'a'; len], TunFlags::TUN).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }
    }

    #[test]
    fn rejects_embedded_nul() {
        let err = IfReq::new(b"tun\0x", TunFlags::TUN).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn unknown_kernel_bits_are_kept() {
        let mut req = IfReq::zeroed();
        req.flags = 0x1001 | 0x0200;
        assert!(req.flags().contains(TunFlags::TUN | TunFlags::NO_PI));
        assert_eq!(req.flags().bits(), 0x1201);
    }
}
