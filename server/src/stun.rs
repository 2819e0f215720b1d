use bytes::Bytes;
use log::{debug, error};
use ministun::constants::*;
use ministun::header::{Header, MessageClass};
use ministun::message::XorMappedResponse;
use ministun::util::print_bytes;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

// 只接受不带属性的 binding request
pub fn parse_request(buf: &[u8]) -> Result<Header, String> {
    if buf.len() < HEADER_LEN {
        return Err(format!("header buf len:{} < {}", buf.len(), HEADER_LEN));
    }

    let mut header_buf = [0_u8; HEADER_LEN];
    header_buf.copy_from_slice(&buf[..HEADER_LEN]);
    let header = Header::unpack(&header_buf);

    if header.class != MessageClass::Request || header.method != METHOD_BINDING {
        return Err(format!(
            "not a binding request: {:?}, method {:#06x}",
            header.class, header.method
        ));
    }
    if header.cookie != MAGIC_COOKIE {
        return Err(format!("magic cookie: {:#010x}", header.cookie));
    }
    if header.msg_len as usize != buf.len() - HEADER_LEN {
        return Err(format!(
            "header len:{} != {}",
            header.msg_len,
            buf.len() - HEADER_LEN
        ));
    }

    Ok(header)
}

// ipv6 的请求没有响应
pub fn get_response(req: &Header, remote_addr: SocketAddr) -> Option<Bytes> {
    match remote_addr {
        SocketAddr::V4(v) => Some(XorMappedResponse::new(req.trans_id, v).pack()),
        SocketAddr::V6(_) => None,
    }
}

pub async fn send_response(socket: &UdpSocket, data: &[u8], dst_addr: SocketAddr) {
    match socket.send_to(data, dst_addr).await {
        Ok(v) => {
            debug!(
                "{:?} ---> {}\n{}",
                socket.local_addr(),
                dst_addr,
                print_bytes(data, " ", 8)
            );
            debug!("sent: {}", v);
        }
        Err(e) => {
            error!("error, ---> {}, {:?}", dst_addr, e);
        }
    };
}
