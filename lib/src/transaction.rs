//! One binding transaction, independent of how bytes reach the socket.
//!
//! The blocking and async engines both drive a [`Transaction`]: they hand it
//! the number of bytes the request send reported and every datagram they
//! receive, and it decides whether to keep reading, fail, or finish.

use std::net::{SocketAddr, SocketAddrV4};

use bytes::Bytes;
use log::debug;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::header::{Header, MessageClass, TransId};
use crate::message::XorMappedResponse;
use crate::util::{new_trans_id, print_bytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    // 还没有发出请求
    SendRequest,
    // 请求已交给socket, 等待发送结果
    ReceiveResponse,
    // 等待来自 server 的响应, 无关的包会被丢弃
    Cleanup,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    // 不是 server 发来的, 或者是旧事务的响应
    Discarded,
    Resolved(SocketAddrV4),
}

#[derive(Debug)]
pub struct Transaction {
    server: SocketAddrV4,
    request: Header,
    state: State,
}

impl Transaction {
    pub fn new(server: SocketAddrV4) -> Self {
        Self::with_trans_id(server, new_trans_id())
    }

    pub fn with_trans_id(server: SocketAddrV4, trans_id: TransId) -> Self {
        Self {
            server,
            request: Header::binding_request(trans_id),
            state: State::SendRequest,
        }
    }

    pub fn server(&self) -> SocketAddrV4 {
        self.server
    }

    pub fn trans_id(&self) -> &TransId {
        &self.request.trans_id
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Encodes the binding request. The caller must send it to [`Self::server`]
    /// and report the outcome through [`Self::on_sent`].
    pub fn request(&mut self) -> Bytes {
        debug_assert_eq!(self.state, State::SendRequest);
        self.state = State::ReceiveResponse;
        self.request.pack()
    }

    pub fn on_sent(&mut self, sent: usize) -> Result<()> {
        debug_assert_eq!(self.state, State::ReceiveResponse);
        if sent != self.request.len() {
            self.state = State::Done;
            return Err(Error::bad_message(format!(
                "sent len:{} != {}",
                sent,
                self.request.len()
            )));
        }

        self.state = State::Cleanup;
        Ok(())
    }

    pub fn on_datagram(&mut self, buf: &[u8], from: SocketAddr) -> Result<Received> {
        debug_assert_eq!(self.state, State::Cleanup);

        if from != SocketAddr::V4(self.server) {
            debug!(
                "discard {} bytes from {}, expect {}",
                buf.len(),
                from,
                self.server
            );
            return Ok(Received::Discarded);
        }

        debug!("response <-- {}\n{}", from, print_bytes(buf, " ", 8));

        match self.decode(buf) {
            Ok(Received::Discarded) => Ok(Received::Discarded),
            other => {
                self.state = State::Done;
                other
            }
        }
    }

    fn decode(&self, buf: &[u8]) -> Result<Received> {
        // 超时后迟到的响应, 不论长度和 class, 继续等待
        if let Some(header_buf) = buf.get(..HEADER_LEN) {
            let mut fixed = [0_u8; HEADER_LEN];
            fixed.copy_from_slice(header_buf);
            if Header::unpack(&fixed).trans_id != self.request.trans_id {
                debug!("discard response of another transaction");
                return Ok(Received::Discarded);
            }
        }

        let buf: &[u8; RESPONSE_LEN] = buf.try_into().map_err(|_| {
            Error::bad_message(format!("response len:{} != {}", buf.len(), RESPONSE_LEN))
        })?;
        let response = XorMappedResponse::unpack(buf);
        let header = &response.header;

        if header.class != MessageClass::SuccessResponse {
            return Err(Error::bad_message(format!(
                "response class: {:?}",
                header.class
            )));
        }
        if header.method != METHOD_BINDING {
            return Err(Error::bad_message(format!(
                "response method: {:#06x}",
                header.method
            )));
        }
        if header.cookie != MAGIC_COOKIE {
            return Err(Error::bad_message(format!(
                "magic cookie: {:#010x}",
                header.cookie
            )));
        }

        if header.msg_len as usize != RESPONSE_LEN - HEADER_LEN {
            return Err(Error::bad_message(format!(
                "header len:{} != {}",
                header.msg_len,
                RESPONSE_LEN - HEADER_LEN
            )));
        }
        if response.attr.attr_type != ATTR_XOR_MAPPED_ADDRESS {
            return Err(Error::bad_message(format!(
                "attr type: {:#06x}",
                response.attr.attr_type
            )));
        }
        if response.attr.attr_len as usize != XOR_ADDRESS_V4_LEN {
            return Err(Error::bad_message(format!(
                "attr len:{} != {}",
                response.attr.attr_len, XOR_ADDRESS_V4_LEN
            )));
        }
        if response.body.family != ATTR_FAMILY_IPV4 {
            return Err(Error::bad_message(format!(
                "ip family: {}",
                response.body.family
            )));
        }

        Ok(Received::Resolved(response.address()))
    }
}

pub fn server_v4(server: SocketAddr) -> Result<SocketAddrV4> {
    match server {
        SocketAddr::V4(v) => Ok(v),
        SocketAddr::V6(_) => Err(Error::NotIpv4),
    }
}
