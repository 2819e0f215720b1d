//! Socket posture that the engines borrow for one transaction and hand back.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use log::{debug, warn};
use socket2::SockRef;

pub fn is_connected(socket: &UdpSocket) -> bool {
    socket.peer_addr().is_ok()
}

#[cfg(unix)]
pub fn is_nonblocking(socket: &UdpSocket) -> io::Result<bool> {
    SockRef::from(socket).nonblocking()
}

// windows 没有查询 FIONBIO 的接口, std 创建的 socket 默认阻塞
#[cfg(not(unix))]
pub fn is_nonblocking(_socket: &UdpSocket) -> io::Result<bool> {
    Ok(false)
}

/// Dissolves the association made by `connect`.
#[cfg(unix)]
pub fn disconnect(socket: &UdpSocket) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: sockaddr is plain data, all-zero is a valid value
    let mut addr: libc::sockaddr = unsafe { std::mem::zeroed() };
    addr.sa_family = libc::AF_UNSPEC as libc::sa_family_t;

    // SAFETY: addr is a valid sockaddr of the size passed
    let ret = unsafe {
        libc::connect(
            socket.as_raw_fd(),
            &addr,
            std::mem::size_of::<libc::sockaddr>() as libc::socklen_t,
        )
    };
    if ret == -1 {
        let e = io::Error::last_os_error();
        // bsd 会断开连接但仍返回 EAFNOSUPPORT
        if e.raw_os_error() != Some(libc::EAFNOSUPPORT) {
            return Err(e);
        }
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn disconnect(socket: &UdpSocket) -> io::Result<()> {
    socket.connect(SocketAddr::from(([0, 0, 0, 0], 0)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub nonblocking: bool,
    pub read_timeout: Option<Duration>,
    pub peer: Option<SocketAddr>,
    pub local: SocketAddr,
}

impl Snapshot {
    pub fn capture(socket: &UdpSocket) -> io::Result<Self> {
        Ok(Self {
            nonblocking: is_nonblocking(socket)?,
            read_timeout: socket.read_timeout()?,
            peer: socket.peer_addr().ok(),
            local: socket.local_addr()?,
        })
    }

    pub fn restore(&self, socket: &UdpSocket) -> io::Result<()> {
        socket.set_nonblocking(self.nonblocking)?;
        socket.set_read_timeout(self.read_timeout)
    }

    // 重新连接原来的 peer, 或者断开
    pub fn restore_peer(&self, socket: &UdpSocket) -> io::Result<()> {
        match self.peer {
            Some(peer) => socket.connect(peer),
            None => {
                disconnect(socket)?;
                self.restore_local(socket)
            }
        }
    }

    // linux 断开时会释放自动分配的端口, 需要重新绑定
    fn restore_local(&self, socket: &UdpSocket) -> io::Result<()> {
        let local = socket.local_addr()?;
        if local == self.local {
            return Ok(());
        }

        debug!("rebind {} after disconnect, was {}", self.local, local);
        SockRef::from(socket).bind(&self.local.into())
    }
}

/// Restores the snapshot when dropped, so a cancelled future still hands
/// the socket back in its original posture.
pub struct RestoreGuard<'a> {
    socket: &'a UdpSocket,
    snapshot: Snapshot,
    peer: bool,
    armed: bool,
}

impl<'a> RestoreGuard<'a> {
    pub fn new(socket: &'a UdpSocket, snapshot: Snapshot) -> Self {
        Self {
            socket,
            snapshot,
            peer: false,
            armed: true,
        }
    }

    /// Also reconnect to the original peer, or disconnect, on restore.
    pub fn with_peer(mut self) -> Self {
        self.peer = true;
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn restore(mut self) -> io::Result<()> {
        self.armed = false;
        self.restore_all()
    }

    fn restore_all(&self) -> io::Result<()> {
        if self.peer {
            self.snapshot.restore_peer(self.socket)?;
        }
        self.snapshot.restore(self.socket)
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.restore_all() {
            warn!("error, restore socket state, {:?}", e);
        }
    }
}
