use crate::constants::TRANS_ID_LEN;
use crate::header::TransId;
use rand::prelude::*;
use std::fmt::Write as _;

pub fn print_bytes(buf: &[u8], separator: &str, row_width: usize) -> String {
    let mut hex = String::new();
    buf.iter().enumerate().for_each(|(x, y)| {
        let _ = write!(hex, "{:02X}", y);
        if (x + 1) % row_width == 0 {
            hex.push('\n');
        } else {
            hex.push_str(separator);
        }
    });

    hex
}

pub fn new_trans_id() -> TransId {
    let mut trans_id = [0u8; TRANS_ID_LEN];
    rand::thread_rng().fill_bytes(&mut trans_id);
    trans_id
}

// xor 自反, 编码和解码是同一个操作
pub fn xor_port(port: u16, cookie: u32) -> u16 {
    port ^ (cookie >> 16) as u16
}

pub fn xor_addr(addr: u32, cookie: u32) -> u32 {
    addr ^ cookie
}
