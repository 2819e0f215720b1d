//! Async engine on tokio.
//!
//! The engine itself never times out. [`async_get_address`] races it against
//! `tokio::time::timeout`; when the timer wins the in-flight receive is
//! dropped together with its buffer and the caller gets `Ok(None)`. A
//! response that arrives later stays in the socket buffer unread.

use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use log::debug;

use crate::constants::RECV_BUF_LEN;
use crate::error::{Error, Result};
use crate::io::{AsyncDatagramSocket, ConnectedSocket};
use crate::socket_state::{is_connected, RestoreGuard, Snapshot};
use crate::transaction::{server_v4, Received, Transaction};
use crate::util::print_bytes;

/// Asks `server` for the public endpoint of `socket` without blocking the
/// calling thread. Must be called within a tokio runtime.
///
/// The socket must not be connected. Its non-blocking flag is restored on
/// every exit path, including when the returned future is dropped.
pub async fn async_get_address(
    socket: &UdpSocket,
    server: SocketAddr,
    timeout: Duration,
) -> Result<Option<SocketAddrV4>> {
    let server = server_v4(server)?;

    if is_connected(socket) {
        return Err(Error::AlreadyConnected);
    }

    let guard = RestoreGuard::new(socket, Snapshot::capture(socket)?);
    socket.set_nonblocking(true)?;

    let result = {
        let io = tokio::net::UdpSocket::from_std(socket.try_clone()?)?;
        race(timeout, async_get_address_impl(&io, server)).await
    };

    guard.restore()?;
    result
}

/// Like [`async_get_address`], but connects the socket to `server` for the
/// exchange so the OS drops datagrams from other peers. Afterwards the
/// socket is reconnected to its original peer, or disconnected if it had none.
pub async fn async_get_address_connected(
    socket: &UdpSocket,
    server: SocketAddr,
    timeout: Duration,
) -> Result<Option<SocketAddrV4>> {
    let server = server_v4(server)?;

    let guard = RestoreGuard::new(socket, Snapshot::capture(socket)?).with_peer();
    socket.set_nonblocking(true)?;
    socket.connect(server)?;

    let result = {
        let io = ConnectedSocket(tokio::net::UdpSocket::from_std(socket.try_clone()?)?);
        race(timeout, async_get_address_impl(&io, server)).await
    };

    guard.restore()?;
    result
}

async fn race<F>(timeout: Duration, fut: F) -> Result<Option<SocketAddrV4>>
where
    F: std::future::Future<Output = Result<SocketAddrV4>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(v) => v.map(Some),
        Err(_) => {
            debug!("no response within {:?}", timeout);
            Ok(None)
        }
    }
}

/// One binding transaction over any suspending datagram socket.
pub async fn async_get_address_impl<S>(socket: &S, server: SocketAddrV4) -> Result<SocketAddrV4>
where
    S: AsyncDatagramSocket + ?Sized,
{
    let mut trans = Transaction::new(server);
    drive(socket, &mut trans).await
}

/// Runs `trans` to completion: send, then receive until a datagram from the
/// server resolves or fails the transaction.
pub async fn drive<S>(socket: &S, trans: &mut Transaction) -> Result<SocketAddrV4>
where
    S: AsyncDatagramSocket + ?Sized,
{
    let server = trans.server();
    let request = trans.request();
    debug!(
        "{:?} --> {}\n{}",
        socket.local_addr(),
        server,
        print_bytes(&request, " ", 8)
    );

    let sent = socket.send_to(&request, server.into()).await?;
    trans.on_sent(sent)?;

    let mut buf = vec![0_u8; RECV_BUF_LEN];
    loop {
        let (len, remote_addr) = socket.recv_from(&mut buf).await?;
        match trans.on_datagram(&buf[..len], remote_addr)? {
            Received::Discarded => continue,
            Received::Resolved(v) => return Ok(v),
        }
    }
}
