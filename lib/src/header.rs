#![allow(clippy::len_without_is_empty)]

use crate::constants::*;
use bytes::{BufMut, Bytes, BytesMut};

pub type TransId = [u8; TRANS_ID_LEN];

// rfc 5389, 6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Request = 0b00,
    Indication = 0b01,
    SuccessResponse = 0b10,
    ErrorResponse = 0b11,
}

impl MessageClass {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => MessageClass::Request,
            0b01 => MessageClass::Indication,
            0b10 => MessageClass::SuccessResponse,
            _ => MessageClass::ErrorResponse,
        }
    }
}

//  0                 1
//  2  3  4 5 6 7 8 9 0 1 2 3 4 5
// +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
// |M |M |M|M|M|C|M|M|M|C|M|M|M|M|
// |11|10|9|8|7|1|6|5|4|0|3|2|1|0|
// +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
pub fn pack_msg_type(method: u16, class: MessageClass) -> u16 {
    let c = class as u16;

    (method & 0x000f)
        | (c & 0b01) << 4
        | (method & 0x0070) << 1
        | (c & 0b10) << 7
        | (method & 0x0f80) << 2
}

pub fn unpack_msg_type(msg_type: u16) -> (u16, MessageClass) {
    let method = (msg_type & 0x000f) | (msg_type >> 1 & 0x0070) | (msg_type >> 2 & 0x0f80);
    let class = (msg_type >> 4 & 0b01) | (msg_type >> 7 & 0b10);

    (method, MessageClass::from_bits(class as u8))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub method: u16,
    pub class: MessageClass,

    // 不包括header的20字节
    pub msg_len: u16,

    pub cookie: u32,
    pub trans_id: TransId,
}

impl Header {
    pub fn new(class: MessageClass, msg_len: u16, trans_id: TransId) -> Self {
        Self {
            method: METHOD_BINDING,
            class,
            msg_len,
            cookie: MAGIC_COOKIE,
            trans_id,
        }
    }

    /// A bare binding request: no attributes, so the body length is zero.
    pub fn binding_request(trans_id: TransId) -> Self {
        Self::new(MessageClass::Request, 0, trans_id)
    }

    pub fn len(&self) -> usize {
        HEADER_LEN
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN);
        self.pack_into(&mut buf);
        buf.freeze()
    }

    pub fn pack_into(&self, buf: &mut BytesMut) {
        buf.put_u16(pack_msg_type(self.method, self.class));
        buf.put_u16(self.msg_len);
        buf.put_u32(self.cookie);
        buf.put_slice(&self.trans_id);
    }

    // 只解析字段，不检查有效性
    pub fn unpack(buf: &[u8; HEADER_LEN]) -> Self {
        let mut index = 0_usize;
        let (method, class) = unpack_msg_type(u16::from_be_bytes([buf[index], buf[index + 1]]));

        index += 2;
        let msg_len = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        let cookie = u32::from_be_bytes([
            buf[index],
            buf[index + 1],
            buf[index + 2],
            buf[index + 3],
        ]);

        index += 4;
        let mut trans_id = [0_u8; TRANS_ID_LEN];
        trans_id.copy_from_slice(&buf[index..]);

        Self {
            method,
            class,
            msg_len,
            cookie,
            trans_id,
        }
    }
}
