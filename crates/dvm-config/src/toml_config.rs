use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::bridge_config::{
    BridgeConfig, CfgAudio, CfgCall, CfgFne, CfgPreamble, CfgSystem, CfgUdpAudio, SharedConfig, TxMode, VocoderBackend,
    default_tone_hz, default_tone_length_ms,
};

const EXPECTED_CONFIG_VERSION: &str = "0.1";

/// Build `SharedConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    if root.config_version != EXPECTED_CONFIG_VERSION {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, EXPECTED_CONFIG_VERSION
        )
        .into());
    }
    reject_extra("top-level", &root.extra)?;
    reject_extra("system", &root.system.extra)?;
    reject_extra("fne", &root.fne.extra)?;
    reject_extra("call", &root.call.extra)?;
    if let Some(ref p) = root.preamble {
        reject_extra("preamble", &p.extra)?;
    }
    if let Some(ref a) = root.audio {
        reject_extra("audio", &a.extra)?;
    }
    if let Some(ref u) = root.udp_audio {
        reject_extra("udp_audio", &u.extra)?;
    }

    let mut cfg = BridgeConfig {
        debug_log: root.debug_log,
        system: CfgSystem {
            name: root.system.name,
            peer_id: root.system.peer_id,
            raw_packet_trace: root.system.raw_packet_trace.unwrap_or(false),
        },
        fne: CfgFne {
            address: root.fne.address,
            port: root.fne.port,
            bind_address: root.fne.bind_address.unwrap_or_else(|| "0.0.0.0:0".to_string()),
        },
        call: apply_call(root.call),
        preamble: CfgPreamble::default(),
        audio: CfgAudio::default(),
        udp_audio: None,
    };

    if let Some(p) = root.preamble {
        apply_preamble_patch(&mut cfg.preamble, p);
    }
    if let Some(a) = root.audio {
        apply_audio_patch(&mut cfg.audio, a);
    }
    cfg.udp_audio = root.udp_audio.map(|u| CfgUdpAudio {
        send_address: u.send_address,
        send_port: u.send_port,
        receive_address: u.receive_address,
        receive_port: u.receive_port,
        metadata: u.metadata.unwrap_or(false),
    });

    Ok(SharedConfig::try_from_config(cfg)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(BufReader::new(f))
}

fn apply_call(src: CallDto) -> CfgCall {
    CfgCall {
        source_id: src.source_id,
        destination_id: src.destination_id,
        slot: src.slot,
        tx_mode: src.tx_mode,
        vox_sample_level: src.vox_sample_level.unwrap_or(30.0),
        drop_time_ms: src.drop_time_ms.unwrap_or(180),
        grant_demand: src.grant_demand.unwrap_or(false),
        override_source_id_from_mdc: src.override_source_id_from_mdc.unwrap_or(false),
        override_source_id_from_udp: src.override_source_id_from_udp.unwrap_or(false),
    }
}

fn apply_preamble_patch(dst: &mut CfgPreamble, src: PreambleDto) {
    dst.leader_tone = src.leader_tone;
    dst.tone_hz = src.tone_hz;
    dst.length_ms = src.length_ms;
}

fn apply_audio_patch(dst: &mut CfgAudio, src: AudioDto) {
    if let Some(v) = src.tx_gain {
        dst.tx_gain = v;
    }
    if let Some(v) = src.rx_gain {
        dst.rx_gain = v;
    }
    if let Some(v) = src.vocoder {
        dst.vocoder = v;
    }
}

fn reject_extra(section: &str, extra: &HashMap<String, Value>) -> Result<(), Box<dyn std::error::Error>> {
    if extra.is_empty() {
        Ok(())
    } else {
        Err(format!("Unrecognized fields in {}: {:?}", section, sorted_keys(extra)).into())
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    system: SystemDto,
    fne: FneDto,
    call: CallDto,

    #[serde(default)]
    preamble: Option<PreambleDto>,

    #[serde(default)]
    audio: Option<AudioDto>,

    #[serde(default)]
    udp_audio: Option<UdpAudioDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct SystemDto {
    name: String,
    peer_id: u32,
    raw_packet_trace: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct FneDto {
    address: String,
    port: u16,
    bind_address: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct CallDto {
    source_id: u32,
    destination_id: u32,
    slot: u8,
    tx_mode: TxMode,
    vox_sample_level: Option<f32>,
    drop_time_ms: Option<u64>,
    grant_demand: Option<bool>,
    override_source_id_from_mdc: Option<bool>,
    override_source_id_from_udp: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct PreambleDto {
    #[serde(default)]
    leader_tone: bool,
    #[serde(default = "default_tone_hz")]
    tone_hz: u32,
    #[serde(default = "default_tone_length_ms")]
    length_ms: u32,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct AudioDto {
    tx_gain: Option<f32>,
    rx_gain: Option<f32>,
    vocoder: Option<VocoderBackend>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct UdpAudioDto {
    send_address: String,
    send_port: u16,
    receive_address: String,
    receive_port: u16,
    metadata: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
