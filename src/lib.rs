/*!
Attach a Linux TUN interface, push raw network-layer packets into it and
read the kernel's replies with a deadline.

# Example:
```no_run
use std::time::Duration;
use tun_probe::{open_tun, SYN_PACKET};

let dev = open_tun("tun0")?;
dev.send(&SYN_PACKET)?;
match dev.read_with_timeout(1024, Duration::from_secs(1)) {
    Ok(reply) if reply.is_empty() => println!("interface closed"),
    Ok(reply) => println!("reply = {:02x?}", &reply[..]),
    Err(tun_probe::Error::TimedOut) => println!("no reply"),
    Err(err) => return Err(err.into()),
}
# Ok::<(), tun_probe::BoxError>(())
```
*/

#![cfg_attr(docsrs, feature(doc_cfg))]

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        pub use crate::builder::DeviceBuilder;
        pub use crate::device::{open_tun, read_with_timeout, TimeoutReader, TunHandle};
        pub use crate::platform::{Device, IfReq, TunFlags, IFREQ_LEN, MAX_NAME_LEN};

        mod builder;
        mod device;
        pub mod platform;
    } else {
        compile_error!("tun-probe drives the Linux TUN/TAP driver and only builds for Linux");
    }
}

pub use crate::error::{BoxError, Error, Result};

mod error;

/// An IPv4 TCP SYN from 192.0.2.2:30732 to 34.194.149.67:80, MSS 1460,
/// checksums filled in.
pub const SYN_PACKET: [u8; 44] = [
    0x45, 0x00, 0x00, 0x2c, 0x00, 0x01, 0x00, 0x00, 0x40, 0x06, 0x00, 0xc4, 0xc0, 0x00, 0x02, 0x02,
    0x22, 0xc2, 0x95, 0x43, 0x78, 0x0c, 0x00, 0x50, 0xf4, 0x70, 0x98, 0x8b, 0x00, 0x00, 0x00, 0x00,
    0x60, 0x02, 0xff, 0xff, 0x18, 0xc6, 0x00, 0x00, 0x02, 0x04, 0x05, 0xb4,
];

/// IP version from the first nibble of a packet, `None` for an empty buffer.
pub fn ip_version(buf: &[u8]) -> Option<u8> {
    buf.first().map(|b| b >> 4)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn syn_packet_header() {
        assert_eq!(ip_version(&SYN_PACKET), Some(4));
        // Total length field.
        assert_eq!(u16::from_be_bytes([SYN_PACKET[2], SYN_PACKET[3]]), 44);
        // TCP, flags SYN only.
        assert_eq!(SYN_PACKET[9], 6);
        assert_eq!(SYN_PACKET[20 + 13], 0x02);
    }

    #[test]
    fn ip_version_of_empty() {
        assert_eq!(ip_version(&[]), None);
        assert_eq!(ip_version(&[0x60, 0, 0, 0]), Some(6));
    }
}
