//! Peer-side view of the FNE master: function codes, the datagram envelope
//! and the `FnePeer` send interface.

use dvm_core::StreamId;

use super::transports::NetworkError;

/// Function and sub-function codes of a master message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetFunc {
    pub func: u8,
    pub subfunc: u8,
}

impl NetFunc {
    pub const PROTOCOL: u8 = 0x00;
    pub const SUBFUNC_DMR: u8 = 0x00;
    pub const SUBFUNC_P25: u8 = 0x01;

    pub const DMR: NetFunc = NetFunc {
        func: Self::PROTOCOL,
        subfunc: Self::SUBFUNC_DMR,
    };
    pub const P25: NetFunc = NetFunc {
        func: Self::PROTOCOL,
        subfunc: Self::SUBFUNC_P25,
    };
}

impl core::fmt::Display for NetFunc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            NetFunc::DMR => write!(f, "PROTOCOL/DMR"),
            NetFunc::P25 => write!(f, "PROTOCOL/P25"),
            NetFunc { func, subfunc } => write!(f, "{:02X}/{:02X}", func, subfunc),
        }
    }
}

/// Bytes of the envelope preceding every payload
pub const ENVELOPE_LEN: usize = 12;

/// Message exchanged with the master
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FneMessage {
    pub func: NetFunc,
    pub pkt_seq: u16,
    pub stream_id: StreamId,
    pub peer_id: u32,
    pub payload: Vec<u8>,
}

impl FneMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENVELOPE_LEN + self.payload.len());
        out.push(self.func.func);
        out.push(self.func.subfunc);
        out.extend_from_slice(&self.pkt_seq.to_be_bytes());
        out.extend_from_slice(&self.stream_id.to_be_bytes());
        out.extend_from_slice(&self.peer_id.to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, NetworkError> {
        if data.len() < ENVELOPE_LEN {
            return Err(NetworkError::Malformed(format!("{} byte datagram", data.len())));
        }
        Ok(FneMessage {
            func: NetFunc {
                func: data[0],
                subfunc: data[1],
            },
            pkt_seq: u16::from_be_bytes([data[2], data[3]]),
            stream_id: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            peer_id: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
            payload: data[ENVELOPE_LEN..].to_vec(),
        })
    }
}

/// Registered peer connection to the master. Login and keepalive belong to
/// the implementation; the bridge only sends protocol traffic through it.
pub trait FnePeer: Send {
    fn peer_id(&self) -> u32;

    /// Next packet sequence number; `reset` restarts the sequence at 0
    fn pkt_seq(&mut self, reset: bool) -> u16;

    fn send_master(&mut self, func: NetFunc, payload: &[u8], pkt_seq: u16, stream_id: StreamId) -> Result<(), NetworkError>;
}

/// Packet sequence counter as kept by a peer
#[derive(Debug, Default)]
pub struct PktSeqCounter {
    current: u16,
}

impl PktSeqCounter {
    pub fn next(&mut self, reset: bool) -> u16 {
        if reset {
            self.current = 0;
        } else {
            self.current = self.current.wrapping_add(1);
        }
        self.current
    }
}
