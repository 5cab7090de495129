use std::net::{Ipv4Addr, TcpListener};
use std::process::Command;
use std::time::{Duration, Instant};

use pnet_packet::ip::IpNextHeaderProtocols;
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::tcp::{TcpFlags, TcpPacket};
use pnet_packet::Packet;

use tun_probe::{ip_version, open_tun, Error, TunFlags, SYN_PACKET};

fn ip(args: &[&str]) {
    let status = Command::new("ip").args(args).status().unwrap();
    assert!(status.success(), "ip {args:?} failed");
}

#[test]
fn name_too_long_is_rejected_before_open() {
    let err = open_tun("sixteen-bytes-xx").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
#[ignore = "requires CAP_NET_ADMIN"]
fn attach_reports_name_and_flags() {
    let dev = open_tun("tprobe0").unwrap();
    assert_eq!(dev.name().unwrap(), "tprobe0");
    assert_eq!(dev.flags(), TunFlags::TUN | TunFlags::NO_PI);
    assert!(dev.if_index().unwrap() > 0);
    assert!(!dev.is_nonblocking().unwrap());
}

#[test]
#[ignore = "requires CAP_NET_ADMIN"]
fn idle_interface_times_out() {
    let dev = open_tun("tprobe1").unwrap();
    let start = Instant::now();
    let err = dev
        .read_with_timeout(1500, Duration::from_millis(200))
        .unwrap_err();
    assert!(matches!(err, Error::TimedOut));
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[test]
#[ignore = "requires CAP_NET_ADMIN"]
fn name_collision_is_a_configuration_error() {
    let _held = open_tun("tprobe3").unwrap();
    let err = open_tun("tprobe3").unwrap_err();
    match err {
        Error::DeviceConfiguration(os) => assert_eq!(os.raw_os_error(), Some(libc::EBUSY)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
#[ignore = "requires CAP_NET_ADMIN"]
fn persist_toggles() {
    let dev = open_tun("tprobe4").unwrap();
    dev.persist(true).unwrap();
    dev.persist(false).unwrap();
    drop(dev);
    // No longer persistent, so the name is free again.
    let dev = open_tun("tprobe4").unwrap();
    assert_eq!(dev.name().unwrap(), "tprobe4");
}

/// Reroutes TEST-NET-1 through the interface; run inside a dedicated
/// network namespace, e.g. `unshare -n cargo test -- --ignored`.
#[test]
#[ignore = "requires CAP_NET_ADMIN"]
fn syn_gets_an_ipv4_reply() {
    let dev = open_tun("tprobe2").unwrap();
    ip(&["addr", "add", "34.194.149.67/32", "dev", "tprobe2"]);
    ip(&["link", "set", "tprobe2", "up"]);
    ip(&["route", "replace", "192.0.2.0/24", "dev", "tprobe2"]);
    let _listener = TcpListener::bind((Ipv4Addr::new(34, 194, 149, 67), 80)).unwrap();

    assert_eq!(dev.send(&SYN_PACKET).unwrap(), SYN_PACKET.len());

    // The kernel may also emit IPv6 noise once the link is up; skip it.
    let deadline = Instant::now() + Duration::from_secs(5);
    let reply = loop {
        let left = deadline.saturating_duration_since(Instant::now());
        let pkt = dev.read_with_timeout(1500, left).unwrap();
        assert!(!pkt.is_empty());
        if ip_version(&pkt) == Some(4) {
            break pkt;
        }
    };

    let ipv4 = Ipv4Packet::new(&reply).unwrap();
    assert_eq!(ipv4.get_source(), Ipv4Addr::new(34, 194, 149, 67));
    assert_eq!(ipv4.get_destination(), Ipv4Addr::new(192, 0, 2, 2));
    assert_eq!(ipv4.get_next_level_protocol(), IpNextHeaderProtocols::Tcp);
    let tcp = TcpPacket::new(ipv4.payload()).unwrap();
    assert_eq!(tcp.get_source(), 80);
    assert_eq!(tcp.get_destination(), 30732);
    assert_eq!(
        tcp.get_flags() as u16,
        (TcpFlags::SYN | TcpFlags::ACK) as u16
    );
}
