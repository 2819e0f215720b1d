// ./client --server stun.example.org:3478 --mode async --timeout 2000

use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::process::exit;
use std::time::Duration;

use clap::builder::ValueParser;
use clap::{Arg, Command};
use client::client::{probe_nat, resolve_server, Mode};
use log::{debug, error};

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn parse_ip(s: &str) -> Result<IpAddr, String> {
    let ip = match s.parse::<IpAddr>() {
        Ok(v) => v,
        Err(e) => {
            return Err(format!("{}", e));
        }
    };

    match ip {
        IpAddr::V4(_) => Ok(ip),
        IpAddr::V6(_) => Err("ipv6 not support".to_string()),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun client for finding the public endpoint of a udp socket")
        .arg(
            Arg::new("server")
                .long("server")
                .takes_value(true)
                .required(true)
                .help("server host:port")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("local_ip")
                .long("local_ip")
                .takes_value(true)
                .default_value("0.0.0.0")
                .help("local ip")
                .value_parser(ValueParser::new(parse_ip)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .takes_value(true)
                .default_value("2000")
                .help("response timeout, milliseconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .takes_value(true)
                .default_value("async")
                .help("async | blocking | connected")
                .value_parser(ValueParser::new(Mode::parse)),
        )
        .get_matches();

    let server: &String = app.get_one("server").expect("wrong server");
    let local_ip: IpAddr = *app.get_one("local_ip").expect("wrong local ip");
    let timeout: u64 = *app.get_one("timeout").expect("wrong timeout");
    let mode: Mode = *app.get_one("mode").expect("wrong mode");

    let server_addr = match resolve_server(server).await {
        Ok(v) => v,
        Err(e) => {
            error!("error, {}", e);
            exit(2);
        }
    };

    let sock = match UdpSocket::bind(SocketAddr::new(local_ip, 0)) {
        Ok(v) => v,
        Err(e) => {
            error!("error, can't bind, {}", e);
            exit(2);
        }
    };
    debug!("local addr: {:?}", sock.local_addr());

    match probe_nat(sock, server_addr, Duration::from_millis(timeout), mode).await {
        Some(v) => println!("{}", v),
        None => exit(3),
    }
}
