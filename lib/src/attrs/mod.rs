#![allow(clippy::len_without_is_empty)]

use crate::constants::ATTR_PREFIX_LEN;
use bytes::{BufMut, BytesMut};

pub mod xor_address;

// type(2) + length(2), value 紧随其后
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrPrefix {
    pub attr_type: u16,
    pub attr_len: u16,
}

impl AttrPrefix {
    pub fn new(attr_type: u16, attr_len: u16) -> Self {
        Self {
            attr_type,
            attr_len,
        }
    }

    // prefix + 声明的 value 长度
    pub fn len(&self) -> usize {
        self.attr_len as usize + ATTR_PREFIX_LEN
    }

    pub fn pack_into(&self, buf: &mut BytesMut) {
        buf.put_u16(self.attr_type);
        buf.put_u16(self.attr_len);
    }

    pub fn unpack(buf: &[u8; ATTR_PREFIX_LEN]) -> Self {
        Self {
            attr_type: u16::from_be_bytes([buf[0], buf[1]]),
            attr_len: u16::from_be_bytes([buf[2], buf[3]]),
        }
    }
}
