//! Bridge entity: sole owner of the call state, the vocoders and the
//! collaborators. Every input is a method call made from one thread.

use std::time::{Duration, Instant};

use dvm_config::{BridgeConfig, SharedConfig, TxMode};
use dvm_core::{CallChannel, RadioId, StreamId, hex_dump};
use dvm_pdus::dmr::codec::{self, DmrPayload};
use dvm_pdus::dmr::dmrd::DmrdFrame;
use dvm_pdus::dmr::enums::frame_type::FrameType;
use dvm_pdus::dmr::fields::embedded_data::EmbeddedLcCollector;
use dvm_pdus::dmr::fields::lc::DmrLc;
use dvm_pdus::p25::enums::duid::Duid;
use dvm_pdus::p25::ldu::{LduBuffer, decode_message};
use dvm_pdus::p25::{IMBE_PER_LDU, LC_PRIVATE};

use super::hooks::{AcceptAllFrames, CallObserver, FrameValidator, LoggingCallObserver};
use crate::audio::adapter::split_ambe;
use crate::audio::pcm::{apply_gain, peak_level};
use crate::audio::{PcmBlocker, PcmSink, leader_tone};
use crate::call::{CallDirection, CallInfo, RxCallTracker, RxTransition, RxType};
use crate::network::{FneMessage, FnePeer, NetFunc};
use crate::tx::{TxAction, TxPacket, TxSequencer};
use crate::vocoder::{Vocoder, VocoderMode, create_vocoder};

/// RX call without any frame for this long is considered ended
const RX_CALL_TIMEOUT: Duration = Duration::from_secs(2);

pub struct BridgeEntity {
    config: SharedConfig,

    tracker: RxCallTracker,
    sequencer: TxSequencer,
    /// Late entry LC recovery, one per DMR slot
    embedded: [EmbeddedLcCollector; 2],
    blocker: PcmBlocker,
    /// Pre-rendered RX preamble, empty when disabled
    leader_tone: Vec<i16>,

    ambe: Box<dyn Vocoder>,
    imbe: Box<dyn Vocoder>,
    peer: Box<dyn FnePeer>,
    sink: Box<dyn PcmSink>,
    validator: Box<dyn FrameValidator>,
    observer: Box<dyn CallObserver>,
}

impl BridgeEntity {
    pub fn new(config: SharedConfig, peer: Box<dyn FnePeer>, sink: Box<dyn PcmSink>) -> Self {
        let cfg = config.config();
        let leader_tone = if cfg.preamble.leader_tone {
            leader_tone::generate(cfg.preamble.tone_hz, cfg.preamble.length_ms)
        } else {
            Vec::new()
        };
        tracing::info!(
            "BridgeEntity: peer {} TX {} SRC_ID {} TGID {} slot {}",
            cfg.system.peer_id,
            cfg.call.tx_mode,
            cfg.call.source_id,
            cfg.call.destination_id,
            cfg.call.slot
        );

        Self {
            tracker: RxCallTracker::new(),
            sequencer: TxSequencer::new(&cfg),
            embedded: Default::default(),
            blocker: PcmBlocker::new(),
            leader_tone,
            ambe: create_vocoder(cfg.audio.vocoder, VocoderMode::Ambe),
            imbe: create_vocoder(cfg.audio.vocoder, VocoderMode::Imbe),
            peer,
            sink,
            validator: Box::new(AcceptAllFrames),
            observer: Box::new(LoggingCallObserver),
            config,
        }
    }

    pub fn with_validator(mut self, validator: Box<dyn FrameValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn CallObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replaces the configured engines; `ambe` serves DMR and `imbe` P25
    pub fn with_vocoders(mut self, ambe: Box<dyn Vocoder>, imbe: Box<dyn Vocoder>) -> Self {
        self.ambe = ambe;
        self.imbe = imbe;
        self
    }

    pub fn tracker(&self) -> &RxCallTracker {
        &self.tracker
    }

    pub fn sequencer(&self) -> &TxSequencer {
        &self.sequencer
    }

    fn cfg(&self) -> std::sync::Arc<BridgeConfig> {
        self.config.config()
    }

    // ─── TX path ──────────────────────────────────────────────────

    /// Captured PCM of any length. `src_override` is the source ID carried by
    /// UDP audio metadata, if any.
    pub fn handle_pcm(&mut self, samples: &[i16], src_override: Option<RadioId>, now: Instant) {
        let cfg = self.cfg();
        if let Some(src) = src_override {
            if cfg.call.override_source_id_from_udp {
                self.sequencer.set_override(src);
            }
        }

        for mut block in self.blocker.push(samples) {
            // VOX meters the input as captured, before TX gain
            let level = peak_level(&block);
            let rx_busy = self.tracker.any_active();
            let actions = self.sequencer.on_block(level, rx_busy, now);
            self.dispatch(actions, now);
            // A keyed call stays allocated but holds its frames while RX is active
            if !self.sequencer.is_keyed() || rx_busy {
                continue;
            }

            apply_gain(&mut block, cfg.audio.tx_gain);
            let vocoder = match self.sequencer.mode() {
                TxMode::Dmr => &mut self.ambe,
                TxMode::P25 => &mut self.imbe,
            };
            let codeword = match vocoder.encode(&block) {
                Ok(codeword) if codeword.len() == vocoder.mode().codeword_len() => codeword,
                Ok(codeword) => {
                    tracing::warn!("BridgeEntity: {} encoder returned {} bytes", vocoder.mode(), codeword.len());
                    continue;
                }
                Err(e) => {
                    tracing::warn!("BridgeEntity: encode failed: {}", e);
                    continue;
                }
            };
            let actions = self.sequencer.push_codeword(&codeword, now);
            self.dispatch(actions, now);
        }
    }

    /// Source ID reported by the analog (MDC) side channel
    pub fn handle_analog_id(&mut self, src_id: RadioId) {
        if self.cfg().call.override_source_id_from_mdc {
            self.sequencer.set_override(src_id);
        } else {
            tracing::debug!("BridgeEntity: analog ID {} ignored, MDC override disabled", src_id);
        }
    }

    /// Periodic stuck call check. Also ends RX calls whose terminator was lost.
    pub fn watchdog(&mut self, now: Instant) {
        let actions = self.sequencer.watchdog(now);
        self.dispatch(actions, now);

        for (channel, status) in self.tracker.expire_stale(now, RX_CALL_TIMEOUT) {
            tracing::warn!("BridgeEntity: {} RX call timed out without terminator", channel);
            let info = rx_info(channel, status.rx_stream_id, status.rx_rfs, status.rx_tg_id);
            let duration = status.rx_start.map_or(Duration::ZERO, |start| now.saturating_duration_since(start));
            self.observer.call_end(&info, duration);
        }
    }

    /// Ends a live TX call with a best effort terminator
    pub fn shutdown(&mut self, now: Instant) {
        let actions = self.sequencer.shutdown(now);
        self.dispatch(actions, now);
        self.blocker.clear();
    }

    fn dispatch(&mut self, actions: Vec<TxAction>, now: Instant) {
        let channel = self.sequencer.channel();
        let mut failed = false;
        for action in actions {
            match action {
                TxAction::Start(info) => {
                    let status = self.tracker.status_mut(channel);
                    status.tx_stream_id = info.stream_id;
                    status.tx_tg_id = info.dst_id;
                    status.tx_time = Some(now);
                    self.observer.call_start(&info);
                }
                TxAction::Send(packet) => {
                    if failed {
                        continue;
                    }
                    if let Err(e) = self.send(&packet) {
                        tracing::error!("BridgeEntity: send to master failed, aborting TX call: {}", e);
                        failed = true;
                        let aborted = self.sequencer.abort(now);
                        self.dispatch(aborted, now);
                    }
                }
                TxAction::End { info, duration, reason } => {
                    tracing::debug!("BridgeEntity: TX call closed by {}", reason);
                    self.tracker.status_mut(channel).tx_stream_id = 0;
                    self.observer.call_end(&info, duration);
                }
            }
        }
    }

    fn send(&mut self, packet: &TxPacket) -> Result<(), crate::network::NetworkError> {
        let pkt_seq = self.peer.pkt_seq(packet.reset_pkt_seq);
        if self.cfg().system.raw_packet_trace {
            tracing::trace!("BridgeEntity: TX {} {}", packet.func, hex_dump(&packet.payload));
        }
        self.peer.send_master(packet.func, &packet.payload, pkt_seq, packet.stream_id)
    }

    // ─── RX path ──────────────────────────────────────────────────

    /// Message received from the master
    pub fn handle_network(&mut self, msg: FneMessage, now: Instant) {
        if self.cfg().system.raw_packet_trace {
            tracing::trace!("BridgeEntity: RX {} {}", msg.func, hex_dump(&msg.payload));
        }
        match msg.func {
            NetFunc::DMR => self.handle_dmr(&msg.payload, now),
            NetFunc::P25 => self.handle_p25(&msg.payload, msg.stream_id, now),
            other => tracing::debug!("BridgeEntity: ignoring master message {}", other),
        }
    }

    fn handle_dmr(&mut self, data: &[u8], now: Instant) {
        let cfg = self.cfg();
        let frame = match DmrdFrame::from_bytes(data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("BridgeEntity: malformed DMRD frame: {:?}", e);
                return;
            }
        };

        if frame.src_id == 0 {
            tracing::warn!("BridgeEntity: DMR frame without source ID, dropped");
            return;
        }
        if frame.private_call {
            tracing::warn!("BridgeEntity: DMR private call from {} not supported, dropped", frame.src_id);
            return;
        }
        if frame.dst_id != cfg.call.destination_id || frame.slot != cfg.call.slot {
            return;
        }
        if !self.validator.validate_dmr(&frame) {
            tracing::debug!("BridgeEntity: DMR frame rejected by validator");
            return;
        }

        let decoded = match codec::decode(frame.frame_type, frame.dt_or_n, &frame.burst) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!("BridgeEntity: DMR burst not decodable: {:?}", e);
                return;
            }
        };
        let rx_type = match &decoded.payload {
            DmrPayload::Voice(_) => RxType::Voice,
            DmrPayload::VoiceHeader(_) => RxType::VoiceHeader,
            DmrPayload::PrivacyHeader(_) => RxType::PrivacyHeader,
            DmrPayload::Terminator(_) => RxType::Terminator,
            DmrPayload::Data(dt) => {
                tracing::debug!("BridgeEntity: ignoring DMR {} on TS{}", dt, frame.slot);
                return;
            }
        };
        let (header_lc, terminator_lc) = match &decoded.payload {
            DmrPayload::VoiceHeader(lc) => (*lc, None),
            DmrPayload::Terminator(lc) => (None, *lc),
            _ => (None, None),
        };
        if header_lc.is_some_and(|lc| lc.is_private()) || terminator_lc.is_some_and(|lc| lc.is_private()) {
            tracing::warn!("BridgeEntity: DMR private call LC from {} not supported, dropped", frame.src_id);
            return;
        }

        let channel = CallChannel::DmrSlot(frame.slot);
        let info = rx_info(channel, frame.stream_id, frame.src_id, frame.dst_id);
        let slot_idx = channel.status_index();
        match self.tracker.on_frame(channel, frame.stream_id, frame.src_id, frame.dst_id, rx_type, now) {
            RxTransition::CallStart => {
                let lc = header_lc.unwrap_or_else(|| DmrLc::group(frame.src_id, frame.dst_id));
                tracing::debug!("BridgeEntity: {} LC {}", channel, lc);
                self.tracker.status_mut(channel).lc = Some(lc);
                self.embedded[slot_idx].reset();
                self.rx_call_start(&info);
            }
            RxTransition::CallEnd { duration } => {
                self.embedded[slot_idx].reset();
                self.observer.call_end(&info, duration);
                return;
            }
            RxTransition::Continue => {}
        }
        if !self.tracker.status(channel).rx_in_progress() {
            return;
        }

        match decoded.payload {
            DmrPayload::PrivacyHeader(pi) => {
                tracing::info!("BridgeEntity: {} privacy header {}", channel, pi);
                self.tracker.status_mut(channel).pi_lc = Some(pi);
            }
            DmrPayload::Voice(ambe) => {
                if frame.frame_type == FrameType::Voice {
                    self.collect_embedded(channel, &frame.burst);
                } else {
                    self.embedded[slot_idx].reset();
                }
                for codeword in split_ambe(&ambe) {
                    self.play_codeword(VocoderMode::Ambe, &codeword, frame.src_id, frame.dst_id);
                }
            }
            _ => {}
        }
    }

    /// Late entry: the embedded LC replaces the stored one once complete
    fn collect_embedded(&mut self, channel: CallChannel, burst: &[u8]) {
        let Some((emb, fragment)) = codec::decode_embedded(burst) else {
            return;
        };
        let idx = channel.status_index();
        if let Some(lc) = self.embedded[idx].push(emb.lcss, fragment) {
            let status = self.tracker.status_mut(channel);
            if status.lc != Some(lc) {
                tracing::debug!("BridgeEntity: {} embedded LC {}", channel, lc);
                status.lc = Some(lc);
            }
        }
    }

    fn handle_p25(&mut self, data: &[u8], stream_id: StreamId, now: Instant) {
        let cfg = self.cfg();
        let (header, ldu) = match decode_message(data) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!("BridgeEntity: P25 message dropped: {:?}", e);
                return;
            }
        };

        if header.src_id == 0 {
            tracing::warn!("BridgeEntity: P25 frame without source ID, dropped");
            return;
        }
        if header.lco == LC_PRIVATE {
            tracing::warn!("BridgeEntity: P25 private call from {} not supported, dropped", header.src_id);
            return;
        }
        if header.dst_id != cfg.call.destination_id {
            return;
        }
        if matches!(header.duid, Duid::Hdu | Duid::Tsdu | Duid::Pdu) {
            tracing::debug!("BridgeEntity: ignoring P25 {}", header.duid);
            return;
        }
        if !self.validator.validate_p25(&header, ldu.as_ref()) {
            tracing::debug!("BridgeEntity: P25 frame rejected by validator");
            return;
        }

        let rx_type = if header.duid.is_terminator() { RxType::Terminator } else { RxType::Voice };
        let channel = CallChannel::P25;
        let info = rx_info(channel, stream_id, header.src_id, header.dst_id);
        match self.tracker.on_frame(channel, stream_id, header.src_id, header.dst_id, rx_type, now) {
            RxTransition::CallStart => self.rx_call_start(&info),
            RxTransition::CallEnd { duration } => {
                self.observer.call_end(&info, duration);
                return;
            }
            RxTransition::Continue => {}
        }

        if let Some(ldu) = ldu {
            if self.tracker.status(channel).rx_in_progress() {
                self.play_ldu(&ldu, header.src_id, header.dst_id);
            }
        }
    }

    fn play_ldu(&mut self, ldu: &LduBuffer, src_id: RadioId, dst_id: RadioId) {
        for slot in 0..IMBE_PER_LDU {
            self.play_codeword(VocoderMode::Imbe, &ldu.imbe(slot), src_id, dst_id);
        }
    }

    fn rx_call_start(&mut self, info: &CallInfo) {
        self.observer.call_start(info);
        if !self.leader_tone.is_empty() {
            self.sink.play(&self.leader_tone, info.src_id, info.dst_id);
        }
    }

    /// Decodes one codeword and hands the PCM to the sink. Bit errors are
    /// logged; the audio is still played.
    fn play_codeword(&mut self, mode: VocoderMode, codeword: &[u8], src_id: RadioId, dst_id: RadioId) {
        let vocoder = match mode {
            VocoderMode::Ambe => &mut self.ambe,
            VocoderMode::Imbe => &mut self.imbe,
        };
        let mut audio = match vocoder.decode(codeword) {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!("BridgeEntity: {} decode failed: {}", mode, e);
                return;
            }
        };
        if audio.errors > 0 {
            tracing::debug!("BridgeEntity: {} codeword with {} bit errors", mode, audio.errors);
        }
        apply_gain(&mut audio.samples, self.config.config().audio.rx_gain);
        self.sink.play(&audio.samples, src_id, dst_id);
    }
}

fn rx_info(channel: CallChannel, stream_id: StreamId, src_id: RadioId, dst_id: RadioId) -> CallInfo {
    CallInfo {
        direction: CallDirection::Rx,
        channel,
        stream_id,
        src_id,
        dst_id,
    }
}
