use std::time::Duration;

// 0x2112A442
pub const MAGIC_COOKIE: u32 = 0x2112_A442;

pub const TRANS_ID_LEN: usize = 12;
pub const HEADER_LEN: usize = 20;
pub const ATTR_PREFIX_LEN: usize = 4;

// reserved + family + x-port + x-address
pub const XOR_ADDRESS_V4_LEN: usize = 8;

// header + attribute prefix + ipv4 xor-mapped-address body
pub const RESPONSE_LEN: usize = HEADER_LEN + ATTR_PREFIX_LEN + XOR_ADDRESS_V4_LEN;

// 大于 RESPONSE_LEN, 过长的响应才能被发现
pub const RECV_BUF_LEN: usize = 576;

pub const METHOD_BINDING: u16 = 0x0001;

pub const ATTR_FAMILY_IPV4: u8 = 0x01;

pub const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
