/*
一个 socket 收包, mpsc 交给处理任务
处理任务解析请求, 按配置的延迟回复 xor-mapped-address
一个退出watch
*/

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::watch::Receiver as WatchReceiver;

use bytes::Bytes;
use log::{debug, error};
use ministun::util::print_bytes;

use crate::stun::{get_response, parse_request, send_response};

// remote addr, recv data
type SocketInput = (SocketAddr, Bytes);

pub struct Server {
    socket: Arc<UdpSocket>,
    delay: Duration,
    signal_rx: WatchReceiver<bool>,
    queue_tx: Sender<SocketInput>,
    queue_rx: Receiver<SocketInput>,
}

impl Server {
    pub async fn new(
        addr: SocketAddr,
        delay: Duration,
        signal_rx: WatchReceiver<bool>,
    ) -> io::Result<Self> {
        let (queue_tx, queue_rx) = mpsc::channel::<SocketInput>(100);
        let socket = UdpSocket::bind(addr).await?;
        debug!("listening: {:?}", socket.local_addr());

        Ok(Self {
            socket: Arc::new(socket),
            delay,
            signal_rx,
            queue_tx,
            queue_rx,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn run(self) {
        let socket = self.socket.clone();
        let signal_rx = self.signal_rx.clone();
        let sender = self.queue_tx;
        let recv_handle = tokio::spawn(async move {
            recv_udp(socket, sender, signal_rx).await;
        });

        let socket = self.socket;
        let delay = self.delay;
        let receiver = self.queue_rx;
        let signal_rx = self.signal_rx;
        let process_handle = tokio::spawn(async move {
            process_udp(receiver, signal_rx, socket, delay).await;
        });

        let _ = recv_handle.await;
        let _ = process_handle.await;
    }
}

//--------------------------------------------------

async fn recv_udp(
    socket: Arc<UdpSocket>,
    sender: Sender<SocketInput>,
    mut signal_rx: WatchReceiver<bool>,
) {
    let mut buf = vec![0u8; 32 * 1024];

    loop {
        tokio::select! {
            Ok((len,remote_addr)) = socket.recv_from(&mut buf) => {
                let data = Bytes::copy_from_slice(&buf[..len]);

                debug!("recv len: {}", data.len());
                debug!("{:?} <--- {}\n{}",socket.local_addr(),remote_addr,print_bytes(&data," ",8));

                if let Err(e) = sender.send((remote_addr,data)).await {
                    error!("error, recv_udp, {:?}",e);
                }
            },
            _ = signal_rx.changed() => {
                debug!("recv signal, recv_udp will exit.");
                break;
            }
        }
    }
}

async fn process_udp(
    mut receiver: Receiver<SocketInput>,
    mut signal_rx: WatchReceiver<bool>,
    socket: Arc<UdpSocket>,
    delay: Duration,
) {
    loop {
        tokio::select! {
            Some(input) = receiver.recv() => {
                process_one(input, &socket, delay);
            },
            _ = signal_rx.changed() => {
                debug!("recv signal, process_udp will exit.");
                break;
            }
        }
    }
}

fn process_one(input: SocketInput, socket: &Arc<UdpSocket>, delay: Duration) {
    let (remote_addr, buf) = input;
    let request = match parse_request(&buf) {
        Ok(v) => v,
        Err(e) => {
            error!("parse error, from remote:{}, {}", remote_addr, e);
            return;
        }
    };

    let data = match get_response(&request, remote_addr) {
        Some(v) => v,
        None => {
            error!("not an ipv4 remote: {}", remote_addr);
            return;
        }
    };

    // 延迟回复不能阻塞后面的请求
    let socket = socket.clone();
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        send_response(&socket, &data, remote_addr).await;
    });
}
