use std::io::Read;
use std::time::Duration;

use tun_probe::{open_tun, BoxError, Error, SYN_PACKET};

fn main() -> Result<(), BoxError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let dev = open_tun("tun0")?;
    println!("name = {:?}", dev.name()?);
    println!("if_index = {:?}", dev.if_index());

    let mut buf = [0u8; 1024];
    {
        let mut reader = dev.timeout_reader(Duration::from_millis(100));
        while let Ok(n) = reader.read(&mut buf) {
            eprintln!("old {:02x?}", &buf[..n]);
        }
    }

    dev.send(&SYN_PACKET)?;

    match dev.read_with_timeout(buf.len(), Duration::from_secs(2)) {
        Ok(reply) if reply.is_empty() => println!("interface closed"),
        Ok(reply) => println!("reply {:02x?}", &reply[..]),
        Err(Error::TimedOut) => println!("no reply within 2s"),
        Err(err) => return Err(err.into()),
    }

    let mut reader = dev.timeout_reader(Duration::from_millis(100));
    while let Ok(n) = reader.read(&mut buf) {
        eprintln!("extra {:02x?}", &buf[..n]);
    }
    Ok(())
}
