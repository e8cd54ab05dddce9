pub mod dmr_tx;
pub mod p25_tx;
pub mod sequencer;
pub mod vox;

use dvm_core::{RadioId, StreamId};

use crate::network::NetFunc;

pub use sequencer::{EndReason, TxAction, TxSequencer};
pub use vox::VoxDetector;

/// Addressing of the call being transmitted, resolved for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxCall {
    pub stream_id: StreamId,
    pub src_id: RadioId,
    pub dst_id: RadioId,
    /// DMR timeslot, 1 or 2
    pub slot: u8,
    pub peer_id: u32,
}

/// One message for the master
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxPacket {
    pub func: NetFunc,
    pub payload: Vec<u8>,
    /// Restart the peer packet sequence for this message
    pub reset_pkt_seq: bool,
    pub stream_id: StreamId,
}
