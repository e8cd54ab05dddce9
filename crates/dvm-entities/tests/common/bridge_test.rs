use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dvm_config::{BridgeConfig, SharedConfig, TxMode};
use dvm_core::{PCM_BLOCK_MS, PCM_BLOCK_SAMPLES, StreamId};
use dvm_entities::BridgeEntity;
use dvm_entities::network::{FneMessage, NetFunc};
use dvm_entities::vocoder::VocoderMode;
use dvm_pdus::dmr::dmrd::DmrdFrame;

use super::recorders::{CallEvent, PlayedBlock, RecordingObserver, RecordingPeer, RecordingSink, ScriptedVocoder, SentPacket};

pub const LOUD: i16 = 10000;
pub const QUIET: i16 = 0;

pub fn default_test_config(tx_mode: TxMode) -> BridgeConfig {
    BridgeConfig::new(9000100, 1001, 9, tx_mode)
}

/// Bridge entity wired to recording collaborators, driven with a simulated clock
pub struct BridgeTest {
    pub entity: BridgeEntity,
    pub sent: Arc<Mutex<Vec<SentPacket>>>,
    pub played: Arc<Mutex<Vec<PlayedBlock>>>,
    pub events: Arc<Mutex<Vec<CallEvent>>>,
    pub send_fails: Arc<AtomicBool>,
    pub now: Instant,
}

impl BridgeTest {
    pub fn new(cfg: BridgeConfig) -> Self {
        let peer = RecordingPeer::new();
        let sink = RecordingSink::new();
        let observer = RecordingObserver::new();
        let sent = peer.sent.clone();
        let send_fails = peer.fail.clone();
        let played = sink.played.clone();
        let events = observer.events.clone();

        let entity = BridgeEntity::new(SharedConfig::from_config(cfg), Box::new(peer), Box::new(sink))
            .with_observer(Box::new(observer))
            .with_vocoders(
                Box::new(ScriptedVocoder::new(VocoderMode::Ambe)),
                Box::new(ScriptedVocoder::new(VocoderMode::Imbe)),
            );

        Self {
            entity,
            sent,
            played,
            events,
            send_fails,
            now: Instant::now(),
        }
    }

    /// Feeds `count` blocks of constant amplitude, one block period apart
    pub fn feed_blocks(&mut self, amplitude: i16, count: usize) {
        for _ in 0..count {
            self.entity.handle_pcm(&[amplitude; PCM_BLOCK_SAMPLES], None, self.now);
            self.advance(Duration::from_millis(PCM_BLOCK_MS));
        }
    }

    pub fn advance(&mut self, d: Duration) {
        self.now += d;
    }

    pub fn receive(&mut self, func: NetFunc, stream_id: StreamId, payload: Vec<u8>) {
        let msg = FneMessage {
            func,
            pkt_seq: 0,
            stream_id,
            peer_id: 1,
            payload,
        };
        self.entity.handle_network(msg, self.now);
    }

    pub fn take_sent(&self) -> Vec<SentPacket> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn take_played(&self) -> Vec<PlayedBlock> {
        std::mem::take(&mut *self.played.lock().unwrap())
    }

    pub fn take_events(&self) -> Vec<CallEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn fail_sends(&self, fail: bool) {
        self.send_fails.store(fail, Ordering::SeqCst);
    }

    pub fn sent_dmr(&self) -> Vec<DmrdFrame> {
        self.take_sent()
            .iter()
            .map(|p| {
                assert_eq!(p.func, NetFunc::DMR);
                DmrdFrame::from_bytes(&p.payload).unwrap()
            })
            .collect()
    }
}
