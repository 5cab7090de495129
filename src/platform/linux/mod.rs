pub mod sys;

mod device;
mod ifreq;

pub use self::device::Device;
pub use self::ifreq::{IfReq, TunFlags, IFREQ_LEN, MAX_NAME_LEN};
