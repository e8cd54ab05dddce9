use serde::Deserialize;
use std::sync::Arc;

use dvm_core::MAX_RADIO_ID;

/// Protocol used for locally keyed transmissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TxMode {
    Dmr,
    P25,
}

impl core::fmt::Display for TxMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TxMode::Dmr => write!(f, "DMR"),
            TxMode::P25 => write!(f, "P25"),
        }
    }
}

/// Vocoder engine, selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum VocoderBackend {
    /// Emits the silence codeword of each protocol and decodes to silent PCM
    Silence,
}

#[derive(Debug, Clone)]
pub struct CfgSystem {
    /// Name used as a prefix in call logs
    pub name: String,
    /// Peer ID this bridge presents to the master
    pub peer_id: u32,
    /// Hex dump every frame exchanged with the master at trace level
    pub raw_packet_trace: bool,
}

#[derive(Debug, Clone)]
pub struct CfgFne {
    /// Master address, hostname or IP
    pub address: String,
    pub port: u16,
    /// Local address the peer socket binds to
    pub bind_address: String,
}

#[derive(Debug, Clone)]
pub struct CfgCall {
    pub source_id: u32,
    pub destination_id: u32,
    /// DMR timeslot, 1 or 2
    pub slot: u8,
    pub tx_mode: TxMode,
    /// VOX trigger level in thousandths of full scale
    pub vox_sample_level: f32,
    /// Silence after which a keyed call is dropped
    pub drop_time_ms: u64,
    /// Send a grant demand TDU before the first P25 voice frame
    pub grant_demand: bool,
    pub override_source_id_from_mdc: bool,
    pub override_source_id_from_udp: bool,
}

impl CfgCall {
    /// VOX threshold as a peak level in 0..1
    pub fn vox_threshold(&self) -> f32 {
        self.vox_sample_level / 1000.0
    }
}

/// Leader tone written to the audio sink at the start of a received call
#[derive(Debug, Clone)]
pub struct CfgPreamble {
    pub leader_tone: bool,
    pub tone_hz: u32,
    pub length_ms: u32,
}

impl Default for CfgPreamble {
    fn default() -> Self {
        Self {
            leader_tone: false,
            tone_hz: default_tone_hz(),
            length_ms: default_tone_length_ms(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CfgAudio {
    /// Applied to PCM before encode
    pub tx_gain: f32,
    /// Applied to PCM after decode
    pub rx_gain: f32,
    pub vocoder: VocoderBackend,
}

impl Default for CfgAudio {
    fn default() -> Self {
        Self {
            tx_gain: 1.0,
            rx_gain: 1.0,
            vocoder: VocoderBackend::Silence,
        }
    }
}

/// UDP PCM endpoint. When absent the bridge takes PCM only through its handle.
#[derive(Debug, Clone)]
pub struct CfgUdpAudio {
    pub send_address: String,
    pub send_port: u16,
    pub receive_address: String,
    pub receive_port: u16,
    /// Inbound datagrams lead with a source ID, outbound blocks trail source and destination
    pub metadata: bool,
}

#[inline]
pub(crate) fn default_tone_hz() -> u32 {
    2175
}

#[inline]
pub(crate) fn default_tone_length_ms() -> u32 {
    200
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub debug_log: Option<String>,
    pub system: CfgSystem,
    pub fne: CfgFne,
    pub call: CfgCall,
    pub preamble: CfgPreamble,
    pub audio: CfgAudio,
    pub udp_audio: Option<CfgUdpAudio>,
}

impl BridgeConfig {
    /// Minimal configuration used by tests and embedders; talks to a master on localhost.
    pub fn new(peer_id: u32, source_id: u32, destination_id: u32, tx_mode: TxMode) -> Self {
        BridgeConfig {
            debug_log: None,
            system: CfgSystem {
                name: "BRIDGE".to_string(),
                peer_id,
                raw_packet_trace: false,
            },
            fne: CfgFne {
                address: "127.0.0.1".to_string(),
                port: 62031,
                bind_address: "0.0.0.0:0".to_string(),
            },
            call: CfgCall {
                source_id,
                destination_id,
                slot: 1,
                tx_mode,
                vox_sample_level: 30.0,
                drop_time_ms: 180,
                grant_demand: false,
                override_source_id_from_mdc: false,
                override_source_id_from_udp: false,
            },
            preamble: CfgPreamble::default(),
            audio: CfgAudio::default(),
            udp_audio: None,
        }
    }

    /// Validate that all configuration fields hold usable values.
    pub fn validate(&self) -> Result<(), &str> {
        if !(1..=2).contains(&self.call.slot) {
            return Err("call.slot must be 1 or 2");
        }
        if self.call.source_id == 0 || self.call.source_id > MAX_RADIO_ID {
            return Err("call.source_id must be a non-zero 24-bit value");
        }
        if self.call.destination_id == 0 || self.call.destination_id > MAX_RADIO_ID {
            return Err("call.destination_id must be a non-zero 24-bit value");
        }
        if self.call.drop_time_ms == 0 {
            return Err("call.drop_time_ms must be greater than zero");
        }
        if self.call.vox_sample_level.is_nan() || self.call.vox_sample_level < 0.0 {
            return Err("call.vox_sample_level must not be negative");
        }
        if [self.audio.tx_gain, self.audio.rx_gain].iter().any(|g| g.is_nan() || *g < 0.0) {
            return Err("audio gains must not be negative");
        }
        if self.preamble.leader_tone && (self.preamble.tone_hz == 0 || self.preamble.length_ms == 0) {
            return Err("preamble leader tone needs a non-zero tone_hz and length_ms");
        }
        if self.call.override_source_id_from_udp && !self.udp_audio.as_ref().is_some_and(|u| u.metadata) {
            return Err("call.override_source_id_from_udp requires udp_audio.metadata");
        }
        if self.fne.address.is_empty() {
            return Err("fne.address must be set");
        }
        Ok(())
    }
}

/// Validated configuration, shared by every component of the bridge.
#[derive(Clone)]
pub struct SharedConfig {
    cfg: Arc<BridgeConfig>,
}

impl SharedConfig {
    pub fn from_config(cfg: BridgeConfig) -> Self {
        // Check config for validity before returning the SharedConfig object
        match cfg.validate() {
            Ok(_) => {}
            Err(e) => panic!("Invalid bridge configuration: {}", e),
        }
        Self { cfg: Arc::new(cfg) }
    }

    /// Like from_config, but hands the validation error back instead of panicking.
    pub fn try_from_config(cfg: BridgeConfig) -> Result<Self, String> {
        cfg.validate().map_err(|e| e.to_string())?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<BridgeConfig> {
        Arc::clone(&self.cfg)
    }
}
