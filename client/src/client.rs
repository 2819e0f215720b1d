use log::{debug, error, info};
use std::io;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;
use thiserror::Error;
use tokio::net::lookup_host;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("can't resolve {0} to an ipv4 address")]
    Resolve(String),

    #[error(transparent)]
    Stun(#[from] ministun::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("blocking probe aborted, {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Async,
    Blocking,
    Connected,
}

impl Mode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "async" => Ok(Mode::Async),
            "blocking" => Ok(Mode::Blocking),
            "connected" => Ok(Mode::Connected),
            v => Err(format!("unknown mode: {}", v)),
        }
    }
}

// host:port, 只取第一个 ipv4 地址
pub async fn resolve_server(server: &str) -> Result<SocketAddr, ProbeError> {
    let addrs = lookup_host(server).await?;
    for addr in addrs {
        debug!("resolved {} -> {}", server, addr);
        if addr.is_ipv4() {
            return Ok(addr);
        }
    }

    Err(ProbeError::Resolve(server.to_string()))
}

/// Runs one binding transaction in the chosen mode. `Ok(None)` means the
/// server did not answer within `timeout`.
pub async fn probe(
    sock: UdpSocket,
    server: SocketAddr,
    timeout: Duration,
    mode: Mode,
) -> Result<Option<SocketAddrV4>, ProbeError> {
    let addr = match mode {
        Mode::Async => ministun::async_get_address(&sock, server, timeout).await?,
        Mode::Connected => ministun::async_get_address_connected(&sock, server, timeout).await?,
        Mode::Blocking => {
            let res = tokio::task::spawn_blocking(move || {
                ministun::get_address(&sock, server, timeout)
            })
            .await?;

            match res {
                Ok(v) => Some(v),
                Err(e) if e.is_timeout() => None,
                Err(e) => return Err(e.into()),
            }
        }
    };

    Ok(addr)
}

pub async fn probe_nat(
    sock: UdpSocket,
    server: SocketAddr,
    timeout: Duration,
    mode: Mode,
) -> Option<SocketAddrV4> {
    match probe(sock, server, timeout, mode).await {
        Ok(Some(v)) => {
            info!("public endpoint: {}", v);
            Some(v)
        }
        Ok(None) => {
            error!("no response from {} within {:?}", server, timeout);
            None
        }
        Err(e) => {
            error!("error, probe_nat, {:?}", e);
            None
        }
    }
}
