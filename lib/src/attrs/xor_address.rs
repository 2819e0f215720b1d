use crate::constants::*;
use crate::util;
use bytes::{BufMut, BytesMut};
use std::net::{Ipv4Addr, SocketAddrV4};

// xor-mapped-address 端口和ip需要混淆
// port 和 magic cookie 高16位做 xor
// address(ipv4) 和 magic cookie做xor

/// Wire form of an IPv4 XOR-MAPPED-ADDRESS value, still masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorAddressBody {
    pub reserved: u8,
    pub family: u8,
    pub x_port: u16,
    pub x_addr: u32,
}

impl XorAddressBody {
    pub fn from_address(address: SocketAddrV4, cookie: u32) -> Self {
        Self {
            reserved: 0,
            family: ATTR_FAMILY_IPV4,
            x_port: util::xor_port(address.port(), cookie),
            x_addr: util::xor_addr(u32::from(*address.ip()), cookie),
        }
    }

    pub fn port(&self, cookie: u32) -> u16 {
        util::xor_port(self.x_port, cookie)
    }

    pub fn address(&self, cookie: u32) -> Ipv4Addr {
        Ipv4Addr::from(util::xor_addr(self.x_addr, cookie))
    }

    pub fn endpoint(&self, cookie: u32) -> SocketAddrV4 {
        SocketAddrV4::new(self.address(cookie), self.port(cookie))
    }

    pub fn pack_into(&self, buf: &mut BytesMut) {
        buf.put_u8(self.reserved);
        buf.put_u8(self.family);
        buf.put_u16(self.x_port);
        buf.put_u32(self.x_addr);
    }

    pub fn unpack(buf: &[u8; XOR_ADDRESS_V4_LEN]) -> Self {
        Self {
            reserved: buf[0],
            family: buf[1],
            x_port: u16::from_be_bytes([buf[2], buf[3]]),
            x_addr: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        }
    }
}
