pub mod fne_peer;
pub mod transports;
pub mod udp_peer;

pub use fne_peer::{FneMessage, FnePeer, NetFunc};
pub use transports::{NetworkError, NetworkTransport};
