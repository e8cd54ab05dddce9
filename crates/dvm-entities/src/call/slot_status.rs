use std::time::Instant;

use dvm_core::{RadioId, StreamId};
use dvm_pdus::dmr::fields::lc::DmrLc;
use dvm_pdus::dmr::fields::privacy_lc::PrivacyLc;

/// Kind of the last frame seen on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxType {
    /// DMR terminator with LC, P25 TDU or TDULC. Also the idle state.
    Terminator,
    VoiceHeader,
    PrivacyHeader,
    Voice,
}

impl core::fmt::Display for RxType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RxType::Terminator => write!(f, "TERMINATOR"),
            RxType::VoiceHeader => write!(f, "VOICE_HEADER"),
            RxType::PrivacyHeader => write!(f, "PRIVACY_HEADER"),
            RxType::Voice => write!(f, "VOICE"),
        }
    }
}

/// Call state of one logical channel (TS1, TS2, P25)
#[derive(Debug, Clone)]
pub struct SlotStatus {
    pub rx_start: Option<Instant>,
    pub rx_time: Option<Instant>,
    pub tx_time: Option<Instant>,
    /// 0 when no call was seen yet
    pub rx_stream_id: StreamId,
    /// 0 when idle
    pub tx_stream_id: StreamId,
    pub rx_tg_id: RadioId,
    pub tx_tg_id: RadioId,
    pub rx_rfs: RadioId,
    pub rx_type: RxType,
    pub lc: Option<DmrLc>,
    pub pi_lc: Option<PrivacyLc>,
}

impl Default for SlotStatus {
    fn default() -> Self {
        SlotStatus {
            rx_start: None,
            rx_time: None,
            tx_time: None,
            rx_stream_id: 0,
            tx_stream_id: 0,
            rx_tg_id: 0,
            tx_tg_id: 0,
            rx_rfs: 0,
            rx_type: RxType::Terminator,
            lc: None,
            pi_lc: None,
        }
    }
}

impl SlotStatus {
    pub fn rx_in_progress(&self) -> bool {
        self.rx_type != RxType::Terminator
    }
}
