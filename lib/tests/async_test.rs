mod common;

use std::collections::VecDeque;
use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use ministun::constants::{HEADER_LEN, TRANS_ID_LEN};
use ministun::io::AsyncDatagramSocket;
use ministun::message::XorMappedResponse;
use ministun::nonblocking::async_get_address_impl;
use ministun::socket_state::is_nonblocking;
use ministun::{async_get_address, async_get_address_connected, Error};

// 按脚本依次返回数据包, 来源地址可以不是 server
struct ScriptedSocket {
    trans_id: Mutex<Option<[u8; TRANS_ID_LEN]>>,
    script: Mutex<VecDeque<(SocketAddr, SocketAddrV4)>>,
    received: Mutex<usize>,
}

impl ScriptedSocket {
    fn new(script: Vec<(SocketAddr, SocketAddrV4)>) -> Self {
        Self {
            trans_id: Mutex::new(None),
            script: Mutex::new(script.into()),
            received: Mutex::new(0),
        }
    }
}

#[async_trait]
impl AsyncDatagramSocket for ScriptedSocket {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok("10.0.0.2:40000".parse().unwrap())
    }

    async fn send_to(&self, buf: &[u8], _target: SocketAddr) -> io::Result<usize> {
        let mut trans_id = [0_u8; TRANS_ID_LEN];
        trans_id.copy_from_slice(&buf[8..HEADER_LEN]);
        *self.trans_id.lock().unwrap() = Some(trans_id);
        Ok(buf.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let trans_id = *self.trans_id.lock().unwrap();
        let trans_id = trans_id.expect("receive before send");
        let (from, mapped) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "script exhausted"))?;
        *self.received.lock().unwrap() += 1;

        let data = XorMappedResponse::new(trans_id, mapped).pack();
        buf[..data.len()].copy_from_slice(&data);
        Ok((data.len(), from))
    }
}

#[tokio::test]
pub async fn test_stray_packet_is_discarded() {
    let server: SocketAddrV4 = "192.0.2.1:3478".parse().unwrap();
    let stray: SocketAddr = "192.0.2.66:3478".parse().unwrap();
    let bogus: SocketAddrV4 = "198.51.100.9:9".parse().unwrap();

    let socket = ScriptedSocket::new(vec![(stray, bogus), (server.into(), public_endpoint())]);

    let addr = async_get_address_impl(&socket, server).await.unwrap();
    assert_eq!(addr, public_endpoint());
    assert_eq!(*socket.received.lock().unwrap(), 2);
    assert!(socket.script.lock().unwrap().is_empty());
}

#[tokio::test]
pub async fn test_async_get_address() {
    let (server, handle) = spawn_stun_server(public_endpoint(), Duration::ZERO);
    let sock = client_socket();

    let addr = async_get_address(&sock, server, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(addr, Some(public_endpoint()));
    assert!(!is_nonblocking(&sock).unwrap());

    handle.join().unwrap();
}

#[tokio::test]
pub async fn test_async_restores_nonblocking() {
    let (server, handle) = spawn_stun_server(public_endpoint(), Duration::ZERO);
    let sock = client_socket();
    sock.set_nonblocking(true).unwrap();

    let addr = async_get_address(&sock, server, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(addr, Some(public_endpoint()));
    assert!(is_nonblocking(&sock).unwrap());

    handle.join().unwrap();
}

#[tokio::test]
pub async fn test_async_bad_message_restores_nonblocking() {
    let (server, handle) = spawn_responder(Duration::ZERO, |trans_id, remote_addr| {
        let mut buf = XorMappedResponse::new(trans_id, remote_addr).pack().to_vec();
        buf.truncate(buf.len() - 1);
        buf
    });
    let sock = client_socket();

    let err = async_get_address(&sock, server, Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadMessage(_)));
    assert!(!is_nonblocking(&sock).unwrap());

    handle.join().unwrap();
}

#[tokio::test]
pub async fn test_async_timeout_yields_no_result() {
    let (server, _handle) = spawn_stun_server(public_endpoint(), Duration::from_millis(800));
    let sock = client_socket();

    let addr = async_get_address(&sock, server, Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(addr, None);
    assert!(!is_nonblocking(&sock).unwrap());
}

#[tokio::test]
pub async fn test_async_cancelled_future_restores_state() {
    let (server, _handle) = spawn_stun_server(public_endpoint(), Duration::from_millis(800));
    let sock = client_socket();

    let fut = async_get_address(&sock, server, Duration::from_secs(5));
    let res = tokio::time::timeout(Duration::from_millis(100), fut).await;
    assert!(res.is_err());
    assert!(!is_nonblocking(&sock).unwrap());
}

#[tokio::test]
pub async fn test_async_rejects_connected_socket() {
    let (server, _handle) = spawn_stun_server(public_endpoint(), Duration::ZERO);
    let sock = client_socket();
    sock.connect(server).unwrap();

    let err = async_get_address(&sock, server, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyConnected));
}

#[tokio::test]
pub async fn test_connected_variant_disconnects_afterwards() {
    let (server, handle) = spawn_stun_server(public_endpoint(), Duration::ZERO);
    let sock = client_socket();

    let addr = async_get_address_connected(&sock, server, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(addr, Some(public_endpoint()));
    assert!(sock.peer_addr().is_err());
    assert!(!is_nonblocking(&sock).unwrap());

    handle.join().unwrap();
}

#[tokio::test]
pub async fn test_connected_variant_keeps_local_port() {
    let (server, handle) = spawn_responder(Duration::ZERO, |trans_id, remote_addr| {
        XorMappedResponse::new(trans_id, remote_addr).pack().to_vec()
    });
    let sock = client_socket();
    let local = sock.local_addr().unwrap();

    let addr = async_get_address_connected(&sock, server, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(addr.map(SocketAddr::V4), Some(local));
    assert_eq!(sock.local_addr().unwrap(), local);
    assert!(sock.peer_addr().is_err());

    handle.join().unwrap();
}

#[tokio::test]
pub async fn test_connected_variant_transport_error_restores_state() {
    // 绑定后立即关闭, 端口上没有监听者
    let closed = client_socket().local_addr().unwrap();
    let sock = client_socket();
    let local = sock.local_addr().unwrap();

    let err = async_get_address_connected(&sock, closed, Duration::from_secs(2))
        .await
        .unwrap_err();
    match err {
        Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionRefused),
        e => panic!("unexpected error: {:?}", e),
    }
    assert!(!is_nonblocking(&sock).unwrap());
    assert!(sock.peer_addr().is_err());
    assert_eq!(sock.local_addr().unwrap(), local);
}

#[tokio::test]
pub async fn test_connected_variant_reconnects_original_peer() {
    let (server, handle) = spawn_stun_server(public_endpoint(), Duration::ZERO);
    let peer = client_socket();
    let sock = client_socket();
    sock.connect(peer.local_addr().unwrap()).unwrap();

    let addr = async_get_address_connected(&sock, server, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(addr, Some(public_endpoint()));
    assert_eq!(sock.peer_addr().unwrap(), peer.local_addr().unwrap());

    handle.join().unwrap();
}

#[tokio::test]
pub async fn test_rejects_ipv6_server() {
    let sock = client_socket();
    let server: SocketAddr = "[::1]:3478".parse().unwrap();

    let err = async_get_address(&sock, server, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotIpv4));
}
