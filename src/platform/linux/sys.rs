use libc::c_int;
use nix::{ioctl_read, ioctl_write_int, ioctl_write_ptr};

ioctl_read!(tungetiff, b'T', 210, c_int);

ioctl_write_ptr!(tunsetiff, b'T', 202, c_int);
ioctl_write_int!(tunsetpersist, b'T', 203);
