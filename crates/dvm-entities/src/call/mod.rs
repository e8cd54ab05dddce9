pub mod rx_tracker;
pub mod slot_status;

use dvm_core::{CallChannel, RadioId, StreamId};

pub use rx_tracker::{RxCallTracker, RxTransition};
pub use slot_status::{RxType, SlotStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDirection {
    /// Network to PCM
    Rx,
    /// PCM to network
    Tx,
}

impl core::fmt::Display for CallDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CallDirection::Rx => write!(f, "RX"),
            CallDirection::Tx => write!(f, "TX"),
        }
    }
}

/// Envelope of one call as reported to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallInfo {
    pub direction: CallDirection,
    pub channel: CallChannel,
    pub stream_id: StreamId,
    pub src_id: RadioId,
    pub dst_id: RadioId,
}

impl core::fmt::Display for CallInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} {} SRC_ID {} TGID {} stream {:08X}",
            self.direction, self.channel, self.src_id, self.dst_id, self.stream_id
        )
    }
}
