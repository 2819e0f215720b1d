use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // socket 必须是未连接状态
    #[error("socket is already connected")]
    AlreadyConnected,

    // 长度, class, cookie 等不匹配
    #[error("bad message: {0}")]
    BadMessage(String),

    #[error("only ipv4 endpoints are supported")]
    NotIpv4,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// The blocking engine surfaces an expired receive timeout as an OS error:
    /// `WouldBlock` on unix, `TimedOut` on windows.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    pub(crate) fn bad_message(msg: impl Into<String>) -> Self {
        Error::BadMessage(msg.into())
    }
}
