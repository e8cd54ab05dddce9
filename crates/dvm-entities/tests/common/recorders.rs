use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dvm_core::{PCM_BLOCK_SAMPLES, RadioId, StreamId};
use dvm_entities::audio::PcmSink;
use dvm_entities::bridge::CallObserver;
use dvm_entities::call::CallInfo;
use dvm_entities::network::{FnePeer, NetFunc, NetworkError};
use dvm_entities::vocoder::{DecodedAudio, Vocoder, VocoderError, VocoderMode};

#[derive(Debug, Clone)]
pub struct SentPacket {
    pub func: NetFunc,
    pub payload: Vec<u8>,
    pub pkt_seq: u16,
    pub stream_id: StreamId,
}

/// FNE peer collecting everything sent to the master
pub struct RecordingPeer {
    pub sent: Arc<Mutex<Vec<SentPacket>>>,
    /// When set, every send fails
    pub fail: Arc<AtomicBool>,
    seq: u16,
}

impl RecordingPeer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(AtomicBool::new(false)),
            seq: 0,
        }
    }
}

impl FnePeer for RecordingPeer {
    fn peer_id(&self) -> u32 {
        9000100
    }

    fn pkt_seq(&mut self, reset: bool) -> u16 {
        self.seq = if reset { 0 } else { self.seq.wrapping_add(1) };
        self.seq
    }

    fn send_master(&mut self, func: NetFunc, payload: &[u8], pkt_seq: u16, stream_id: StreamId) -> Result<(), NetworkError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NetworkError::SendFailed("link down".to_string()));
        }
        tracing::debug!("send_master: {} seq {} stream {:08X}", func, pkt_seq, stream_id);
        self.sent.lock().unwrap().push(SentPacket {
            func,
            payload: payload.to_vec(),
            pkt_seq,
            stream_id,
        });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PlayedBlock {
    pub samples: Vec<i16>,
    pub src_id: RadioId,
    pub dst_id: RadioId,
}

pub struct RecordingSink {
    pub played: Arc<Mutex<Vec<PlayedBlock>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            played: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl PcmSink for RecordingSink {
    fn play(&mut self, samples: &[i16], src_id: RadioId, dst_id: RadioId) {
        self.played.lock().unwrap().push(PlayedBlock {
            samples: samples.to_vec(),
            src_id,
            dst_id,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    Start(CallInfo),
    End(CallInfo, Duration),
}

pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<CallEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl CallObserver for RecordingObserver {
    fn call_start(&mut self, info: &CallInfo) {
        self.events.lock().unwrap().push(CallEvent::Start(*info));
    }

    fn call_end(&mut self, info: &CallInfo, duration: Duration) {
        self.events.lock().unwrap().push(CallEvent::End(*info, duration));
    }
}

/// Encodes the n-th block to a codeword filled with n (starting at 1); decodes
/// a codeword to a block whose samples all equal its first byte.
pub struct ScriptedVocoder {
    mode: VocoderMode,
    encoded: u8,
}

impl ScriptedVocoder {
    pub fn new(mode: VocoderMode) -> Self {
        Self { mode, encoded: 0 }
    }
}

impl Vocoder for ScriptedVocoder {
    fn mode(&self) -> VocoderMode {
        self.mode
    }

    fn encode(&mut self, _pcm: &[i16]) -> Result<Vec<u8>, VocoderError> {
        self.encoded = self.encoded.wrapping_add(1);
        Ok(vec![self.encoded; self.mode.codeword_len()])
    }

    fn decode(&mut self, codeword: &[u8]) -> Result<DecodedAudio, VocoderError> {
        Ok(DecodedAudio {
            samples: vec![codeword[0] as i16; PCM_BLOCK_SAMPLES],
            errors: 0,
        })
    }
}
