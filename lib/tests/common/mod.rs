#![allow(dead_code)]

use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ministun::constants::HEADER_LEN;
use ministun::header::{Header, TransId};
use ministun::message::XorMappedResponse;

/// Binds a loopback socket that answers the first binding request it gets
/// with whatever `reply` builds, after `delay`.
pub fn spawn_responder<F>(delay: Duration, reply: F) -> (SocketAddr, JoinHandle<()>)
where
    F: FnOnce(TransId, SocketAddrV4) -> Vec<u8> + Send + 'static,
{
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let addr = socket.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let mut buf = [0_u8; 512];
        let (len, remote_addr) = socket.recv_from(&mut buf).unwrap();
        assert_eq!(len, HEADER_LEN);

        let mut header_buf = [0_u8; HEADER_LEN];
        header_buf.copy_from_slice(&buf[..HEADER_LEN]);
        let header = Header::unpack(&header_buf);

        let remote_addr = match remote_addr {
            SocketAddr::V4(v) => v,
            SocketAddr::V6(_) => panic!("ipv6 remote"),
        };

        thread::sleep(delay);
        let data = reply(header.trans_id, remote_addr);
        let _ = socket.send_to(&data, remote_addr);
    });

    (addr, handle)
}

/// A well-behaved server reporting `mapped` as the client's endpoint.
pub fn spawn_stun_server(mapped: SocketAddrV4, delay: Duration) -> (SocketAddr, JoinHandle<()>) {
    spawn_responder(delay, move |trans_id, _| {
        XorMappedResponse::new(trans_id, mapped).pack().to_vec()
    })
}

pub fn client_socket() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").unwrap()
}

pub fn public_endpoint() -> SocketAddrV4 {
    "203.0.113.7:54321".parse().unwrap()
}
