// ./server --ip 1.2.3.4 --port 3478 --delay 0

use log::{error, info};
use std::net::{IpAddr, SocketAddr};
use std::process::exit;
use std::time::Duration;

use clap::builder::ValueParser;
use clap::{Arg, Command};

use server::server::Server;
use server::signal::shutdown_watch;

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
        .about("a minimal stun binding server")
        .arg(
            Arg::new("ip")
                .long("ip")
                .takes_value(true)
                .default_value("0.0.0.0")
                .help("listen ip")
                .value_parser(ValueParser::new(parse_ip)),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .takes_value(true)
                .default_value("3478")
                .help("listen port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("delay")
                .long("delay")
                .takes_value(true)
                .default_value("0")
                .help("response delay, milliseconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .get_matches();

    let ip: IpAddr = *app.get_one("ip").expect("wrong ip");
    let port: u16 = *app.get_one("port").expect("wrong port");
    let delay: u64 = *app.get_one("delay").expect("wrong delay");

    let signal_rx = shutdown_watch();

    let addr = SocketAddr::new(ip, port);
    let server = match Server::new(addr, Duration::from_millis(delay), signal_rx).await {
        Ok(v) => v,
        Err(e) => {
            error!("error, bind {}:{}, {:?}", ip, port, e);
            exit(1);
        }
    };

    info!("start server on {:?} ...", server.local_addr());
    server.run().await;

    println!("end.");
}
