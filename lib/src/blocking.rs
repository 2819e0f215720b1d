//! Blocking engine, for a dedicated thread. The timeout is enforced by the
//! socket's receive timeout, so an expired wait comes back as an I/O error
//! (see [`Error::is_timeout`]).

use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use log::debug;

use crate::constants::RECV_BUF_LEN;
use crate::error::{Error, Result};
use crate::io::DatagramSocket;
use crate::socket_state::{is_connected, Snapshot};
use crate::transaction::{server_v4, Received, Transaction};
use crate::util::print_bytes;

/// Asks `server` for the public endpoint of `socket`.
///
/// The socket must not be connected. Its non-blocking flag and read timeout
/// are restored before returning on every path; if restoring fails, that
/// error is returned in place of the exchange result.
pub fn get_address(
    socket: &UdpSocket,
    server: SocketAddr,
    timeout: Duration,
) -> Result<SocketAddrV4> {
    let server = server_v4(server)?;

    if is_connected(socket) {
        return Err(Error::AlreadyConnected);
    }

    let snapshot = Snapshot::capture(socket)?;
    let result = exchange(socket, server, timeout);
    snapshot.restore(socket)?;

    result
}

fn exchange(socket: &UdpSocket, server: SocketAddrV4, timeout: Duration) -> Result<SocketAddrV4> {
    socket.set_nonblocking(false)?;
    socket.set_read_timeout(Some(timeout))?;

    let mut trans = Transaction::new(server);
    get_address_impl(socket, &mut trans)
}

/// Runs `trans` to completion over a blocking socket.
pub fn get_address_impl<S>(socket: &S, trans: &mut Transaction) -> Result<SocketAddrV4>
where
    S: DatagramSocket + ?Sized,
{
    let server = trans.server();
    let request = trans.request();
    debug!(
        "{:?} --> {}\n{}",
        socket.local_addr(),
        server,
        print_bytes(&request, " ", 8)
    );

    let sent = socket.send_to(&request, server.into())?;
    trans.on_sent(sent)?;

    let mut buf = [0_u8; RECV_BUF_LEN];
    loop {
        let (len, remote_addr) = socket.recv_from(&mut buf)?;
        match trans.on_datagram(&buf[..len], remote_addr)? {
            Received::Discarded => continue,
            Received::Resolved(v) => return Ok(v),
        }
    }
}
