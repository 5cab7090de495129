mod fd;
pub(crate) use self::fd::Fd;

#[cfg(test)]
pub(crate) use self::fd::test::pipe;
