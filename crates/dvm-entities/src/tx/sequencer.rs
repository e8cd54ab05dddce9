//! Transmit call control: VOX keying, stream allocation, the stuck call
//! watchdog and routing codewords to the DMR or P25 framer.

use std::time::{Duration, Instant};

use dvm_config::{BridgeConfig, TxMode};
use dvm_core::{CallChannel, RadioId, StreamId};

use super::dmr_tx::DmrTxState;
use super::p25_tx::P25TxState;
use super::vox::VoxDetector;
use super::{TxCall, TxPacket};
use crate::call::{CallDirection, CallInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Input quiet for the drop time
    Drop,
    /// Key stale for twice the drop time
    Watchdog,
    Shutdown,
    /// Encode or send failure; nothing more is sent for the call
    Aborted,
}

impl core::fmt::Display for EndReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EndReason::Drop => write!(f, "drop"),
            EndReason::Watchdog => write!(f, "watchdog"),
            EndReason::Shutdown => write!(f, "shutdown"),
            EndReason::Aborted => write!(f, "aborted"),
        }
    }
}

/// Ordered effects of one sequencer step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxAction {
    Start(CallInfo),
    Send(TxPacket),
    End {
        info: CallInfo,
        duration: Duration,
        reason: EndReason,
    },
}

pub struct TxSequencer {
    mode: TxMode,
    slot: u8,
    peer_id: u32,
    source_id: RadioId,
    destination_id: RadioId,
    grant_demand: bool,
    vox: VoxDetector,

    /// 0 when no call is keyed
    stream_id: StreamId,
    tx_start: Option<Instant>,
    /// Replaces `source_id` for the current call when non-zero
    src_override: RadioId,
    dmr: DmrTxState,
    p25: P25TxState,
}

impl TxSequencer {
    pub fn new(cfg: &BridgeConfig) -> Self {
        TxSequencer {
            mode: cfg.call.tx_mode,
            slot: cfg.call.slot,
            peer_id: cfg.system.peer_id,
            source_id: cfg.call.source_id,
            destination_id: cfg.call.destination_id,
            grant_demand: cfg.call.grant_demand,
            vox: VoxDetector::new(cfg.call.vox_threshold(), Duration::from_millis(cfg.call.drop_time_ms)),
            stream_id: 0,
            tx_start: None,
            src_override: 0,
            dmr: DmrTxState::new(),
            p25: P25TxState::new(),
        }
    }

    pub fn mode(&self) -> TxMode {
        self.mode
    }

    pub fn channel(&self) -> CallChannel {
        match self.mode {
            TxMode::Dmr => CallChannel::DmrSlot(self.slot),
            TxMode::P25 => CallChannel::P25,
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn is_keyed(&self) -> bool {
        self.stream_id != 0
    }

    /// Source ID for the next frame, override included
    pub fn source_id(&self) -> RadioId {
        if self.src_override != 0 { self.src_override } else { self.source_id }
    }

    pub fn destination_id(&self) -> RadioId {
        self.destination_id
    }

    /// Latest non-zero ID wins until the current (or next) call ends
    pub fn set_override(&mut self, src_id: RadioId) {
        if src_id != 0 && src_id != self.src_override {
            tracing::info!("TX source ID override {}", src_id);
            self.src_override = src_id;
        }
    }

    pub fn dmr_state(&self) -> &DmrTxState {
        &self.dmr
    }

    pub fn p25_state(&self) -> &P25TxState {
        &self.p25
    }

    /// VOX decision for one metered PCM block. Key up and key down only
    /// happen while no RX call is in progress.
    pub fn on_block(&mut self, level: f32, rx_busy: bool, now: Instant) -> Vec<TxAction> {
        let mut actions = Vec::new();
        if self.vox.observe(level, now) {
            if !self.is_keyed() && !rx_busy {
                self.key_up(now, &mut actions);
            }
        } else if self.is_keyed() && !rx_busy && self.vox.drop_elapsed(now) {
            self.key_down(now, EndReason::Drop, &mut actions);
        }
        actions
    }

    /// Frames one encoded codeword of the keyed call
    pub fn push_codeword(&mut self, codeword: &[u8], now: Instant) -> Vec<TxAction> {
        if !self.is_keyed() {
            return Vec::new();
        }
        let call = self.tx_call();
        let result = match self.mode {
            TxMode::Dmr => self.dmr.push_codeword(codeword, &call),
            TxMode::P25 => self.p25.push_codeword(codeword, &call).map(|p| p.into_iter().collect()),
        };
        match result {
            Ok(packets) => packets.into_iter().map(TxAction::Send).collect(),
            Err(e) => {
                tracing::error!("{} TX framing failed: {}", self.mode, e);
                self.abort(now)
            }
        }
    }

    /// Force closes a call whose key went stale. Does nothing when idle.
    pub fn watchdog(&mut self, now: Instant) -> Vec<TxAction> {
        let mut actions = Vec::new();
        if self.is_keyed() && self.vox.is_stale(now) {
            tracing::warn!("{} TX stream {:08X} stuck, forcing call end", self.mode, self.stream_id);
            self.key_down(now, EndReason::Watchdog, &mut actions);
        }
        actions
    }

    /// Closes a live call with a best effort terminator
    pub fn shutdown(&mut self, now: Instant) -> Vec<TxAction> {
        let mut actions = Vec::new();
        if self.is_keyed() {
            self.key_down(now, EndReason::Shutdown, &mut actions);
        }
        actions
    }

    /// Drops the live call without sending anything further
    pub fn abort(&mut self, now: Instant) -> Vec<TxAction> {
        if !self.is_keyed() {
            return Vec::new();
        }
        let info = self.call_info();
        let duration = self.elapsed(now);
        self.clear();
        vec![TxAction::End {
            info,
            duration,
            reason: EndReason::Aborted,
        }]
    }

    fn key_up(&mut self, now: Instant, actions: &mut Vec<TxAction>) {
        self.stream_id = rand::random_range(1..=u32::MAX);
        self.tx_start = Some(now);
        self.dmr.reset();
        self.p25.reset();
        actions.push(TxAction::Start(self.call_info()));

        if self.mode == TxMode::P25 && self.grant_demand {
            let call = self.tx_call();
            actions.push(TxAction::Send(self.p25.tdu(&call, true)));
        }
    }

    fn key_down(&mut self, now: Instant, reason: EndReason, actions: &mut Vec<TxAction>) {
        let call = self.tx_call();
        let info = self.call_info();
        match self.mode {
            TxMode::Dmr => match self.dmr.terminator(&call) {
                Ok(packets) => actions.extend(packets.into_iter().map(TxAction::Send)),
                Err(e) => tracing::error!("DMR terminator not sent: {}", e),
            },
            TxMode::P25 => actions.push(TxAction::Send(self.p25.tdu(&call, false))),
        }
        actions.push(TxAction::End {
            info,
            duration: self.elapsed(now),
            reason,
        });
        self.clear();
    }

    fn clear(&mut self) {
        self.stream_id = 0;
        self.tx_start = None;
        self.src_override = 0;
        self.dmr.reset();
        self.p25.reset();
        self.vox.reset();
    }

    fn elapsed(&self, now: Instant) -> Duration {
        self.tx_start.map_or(Duration::ZERO, |start| now.saturating_duration_since(start))
    }

    fn tx_call(&self) -> TxCall {
        TxCall {
            stream_id: self.stream_id,
            src_id: self.source_id(),
            dst_id: self.destination_id,
            slot: self.slot,
            peer_id: self.peer_id,
        }
    }

    fn call_info(&self) -> CallInfo {
        CallInfo {
            direction: CallDirection::Tx,
            channel: self.channel(),
            stream_id: self.stream_id,
            src_id: self.source_id(),
            dst_id: self.destination_id,
        }
    }
}
