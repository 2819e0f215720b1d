//! Discover the public IPv4 endpoint a NAT assigns to a local UDP socket,
//! using a single STUN binding request and the XOR-MAPPED-ADDRESS attribute.

pub mod attrs;
pub mod blocking;
pub mod constants;
pub mod error;
pub mod header;
pub mod io;
pub mod message;
pub mod nonblocking;
pub mod socket_state;
pub mod transaction;
pub mod util;

pub use blocking::get_address;
pub use error::{Error, Result};
pub use nonblocking::{async_get_address, async_get_address_connected};
