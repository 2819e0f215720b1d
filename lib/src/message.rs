#![allow(clippy::len_without_is_empty)]

use crate::attrs::xor_address::XorAddressBody;
use crate::attrs::AttrPrefix;
use crate::constants::*;
use crate::header::{Header, MessageClass, TransId};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddrV4;

/// A binding success response that carries exactly one IPv4
/// XOR-MAPPED-ADDRESS attribute, the only response shape this client accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorMappedResponse {
    pub header: Header,
    pub attr: AttrPrefix,
    pub body: XorAddressBody,
}

impl XorMappedResponse {
    pub fn new(trans_id: TransId, mapped: SocketAddrV4) -> Self {
        let attr = AttrPrefix::new(ATTR_XOR_MAPPED_ADDRESS, XOR_ADDRESS_V4_LEN as u16);
        let header = Header::new(MessageClass::SuccessResponse, attr.len() as u16, trans_id);
        let body = XorAddressBody::from_address(mapped, header.cookie);

        Self { header, attr, body }
    }

    /// Exact on-wire size; any other datagram length is rejected.
    pub const fn size() -> usize {
        RESPONSE_LEN
    }

    pub fn len(&self) -> usize {
        Self::size()
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RESPONSE_LEN);
        self.header.pack_into(&mut buf);
        self.attr.pack_into(&mut buf);
        self.body.pack_into(&mut buf);
        buf.freeze()
    }

    pub fn unpack(buf: &[u8; RESPONSE_LEN]) -> Self {
        let mut header_buf = [0_u8; HEADER_LEN];
        header_buf.copy_from_slice(&buf[..HEADER_LEN]);

        let mut attr_buf = [0_u8; ATTR_PREFIX_LEN];
        attr_buf.copy_from_slice(&buf[HEADER_LEN..HEADER_LEN + ATTR_PREFIX_LEN]);

        let mut body_buf = [0_u8; XOR_ADDRESS_V4_LEN];
        body_buf.copy_from_slice(&buf[HEADER_LEN + ATTR_PREFIX_LEN..]);

        Self {
            header: Header::unpack(&header_buf),
            attr: AttrPrefix::unpack(&attr_buf),
            body: XorAddressBody::unpack(&body_buf),
        }
    }

    // 使用响应自带的 cookie 解码
    pub fn address(&self) -> SocketAddrV4 {
        self.body.endpoint(self.header.cookie)
    }
}
