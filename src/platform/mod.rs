pub(crate) mod posix;

pub mod linux;
pub use self::linux::*;
