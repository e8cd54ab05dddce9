//! Voice burst construction and decoding for one DMR call.

use dvm_core::FrameParseErr;
use tracing::{debug, trace};

use super::burst::{SILENCE_BURST, pack_ambe, unpack_ambe};
use super::enums::data_type::DataType;
use super::enums::frame_type::FrameType;
use super::fields::emb::Emb;
use super::fields::embedded_data::{EmbeddedLc, read_fragment, write_fragment};
use super::fields::lc::DmrLc;
use super::fields::privacy_lc::PrivacyLc;
use super::fields::sync::SyncPattern;
use super::full_lc;
use super::{DMR_AMBE_LENGTH_BYTES, DMR_FRAME_LENGTH_BYTES, VOICE_FRAMES_PER_SUPERFRAME};

/// One burst ready for the DMRD envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBurst {
    pub frame_type: FrameType,
    /// Data type for data sync bursts, voice index `n` otherwise
    pub dt_or_n: u8,
    pub burst: [u8; DMR_FRAME_LENGTH_BYTES],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmrPayload {
    /// 27 bytes of AMBE, three codewords
    Voice([u8; DMR_AMBE_LENGTH_BYTES]),
    /// None when the full LC failed its parity check
    VoiceHeader(Option<DmrLc>),
    PrivacyHeader(PrivacyLc),
    Terminator(Option<DmrLc>),
    /// Data sync burst the bridge does not interpret
    Data(DataType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDmrFrame {
    pub frame_type: FrameType,
    pub data_type: Option<DataType>,
    pub payload: DmrPayload,
}

pub fn encode_voice_header(lc: &DmrLc) -> Result<EncodedBurst, FrameParseErr> {
    Ok(EncodedBurst {
        frame_type: FrameType::DataSync,
        dt_or_n: DataType::VoiceLcHeader.into_raw() as u8,
        burst: full_lc::encode(lc, DataType::VoiceLcHeader)?,
    })
}

/// Builds voice burst `n` of a superframe. Burst 0 carries the audio sync,
/// bursts 1..5 the EMB and embedded LC fragment for their position.
pub fn encode_voice_frame(ambe: &[u8; DMR_AMBE_LENGTH_BYTES], n: u8, embedded: &EmbeddedLc) -> EncodedBurst {
    let mut burst = [0u8; DMR_FRAME_LENGTH_BYTES];
    pack_ambe(ambe, &mut burst);
    write_middle(&mut burst, n, embedded);
    EncodedBurst {
        frame_type: if n == 0 { FrameType::VoiceSync } else { FrameType::Voice },
        dt_or_n: n,
        burst,
    }
}

fn write_middle(burst: &mut [u8; DMR_FRAME_LENGTH_BYTES], n: u8, embedded: &EmbeddedLc) {
    if n == 0 {
        SyncPattern::Audio.write(burst);
    } else {
        let (lcss, fragment) = embedded.fragment(n);
        Emb::new(lcss).encode(burst);
        write_fragment(burst, fragment);
    }
}

/// Closes a call whose next voice burst would be `n`. Pads the superframe
/// with silence bursts `n..=5`, then appends the terminator with LC.
pub fn encode_terminator(lc: &DmrLc, n: u8) -> Result<Vec<EncodedBurst>, FrameParseErr> {
    let mut out = Vec::new();
    if n != 0 && n < VOICE_FRAMES_PER_SUPERFRAME {
        let embedded = EmbeddedLc::new(lc);
        for pad_n in n..VOICE_FRAMES_PER_SUPERFRAME {
            let mut burst = SILENCE_BURST;
            write_middle(&mut burst, pad_n, &embedded);
            trace!("terminator padding n={}", pad_n);
            out.push(EncodedBurst {
                frame_type: FrameType::Voice,
                dt_or_n: pad_n,
                burst,
            });
        }
    }
    out.push(EncodedBurst {
        frame_type: FrameType::DataSync,
        dt_or_n: DataType::TerminatorWithLc.into_raw() as u8,
        burst: full_lc::encode(lc, DataType::TerminatorWithLc)?,
    });
    Ok(out)
}

/// Decodes a burst given the frame type and low nibble of the DMRD flags byte
pub fn decode(frame_type: FrameType, dt_or_n: u8, burst: &[u8]) -> Result<DecodedDmrFrame, FrameParseErr> {
    dvm_core::expect_len!(burst, DMR_FRAME_LENGTH_BYTES, "burst")?;

    if frame_type != FrameType::DataSync {
        return Ok(DecodedDmrFrame {
            frame_type,
            data_type: None,
            payload: DmrPayload::Voice(unpack_ambe(burst)),
        });
    }

    let data_type = DataType::try_from(dt_or_n as u64).map_err(|_| FrameParseErr::InvalidValue {
        field: "data_type",
        value: dt_or_n as u64,
    })?;
    let payload = match data_type {
        DataType::VoiceLcHeader => DmrPayload::VoiceHeader(lc_or_log(full_lc::decode(burst, data_type))),
        DataType::TerminatorWithLc => DmrPayload::Terminator(lc_or_log(full_lc::decode(burst, data_type))),
        DataType::VoicePiHeader => {
            let (pi, crc_ok) = full_lc::decode_pi(burst)?;
            if !crc_ok {
                debug!("PI header CRC mismatch, using decoded values: {}", pi);
            }
            DmrPayload::PrivacyHeader(pi)
        }
        other => DmrPayload::Data(other),
    };

    Ok(DecodedDmrFrame {
        frame_type,
        data_type: Some(data_type),
        payload,
    })
}

fn lc_or_log(result: Result<DmrLc, FrameParseErr>) -> Option<DmrLc> {
    match result {
        Ok(lc) => Some(lc),
        Err(e) => {
            debug!("full LC not usable: {}", e);
            None
        }
    }
}

/// Reads the embedded fragment of a non-sync voice burst, for late entry LC recovery
pub fn decode_embedded(burst: &[u8]) -> Option<(Emb, u32)> {
    let emb = Emb::decode(burst).ok()?;
    Some((emb, read_fragment(burst)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dmr::fields::emb::Lcss;
    use crate::dmr::fields::embedded_data::EmbeddedLcCollector;

    fn ambe() -> [u8; 27] {
        core::array::from_fn(|i| 0xC0 ^ i as u8)
    }

    #[test]
    fn test_voice_round_trip_all_positions() {
        let lc = DmrLc::group(1234, 9);
        let embedded = EmbeddedLc::new(&lc);
        for n in 0..6 {
            let enc = encode_voice_frame(&ambe(), n, &embedded);
            assert_eq!(enc.dt_or_n, n);
            let dec = decode(enc.frame_type, enc.dt_or_n, &enc.burst).unwrap();
            assert_eq!(dec.payload, DmrPayload::Voice(ambe()));
        }
    }

    #[test]
    fn test_voice_sync_only_at_superframe_start() {
        let embedded = EmbeddedLc::new(&DmrLc::group(1, 2));
        let first = encode_voice_frame(&ambe(), 0, &embedded);
        assert_eq!(first.frame_type, FrameType::VoiceSync);
        assert_eq!(SyncPattern::detect(&first.burst), Some(SyncPattern::Audio));

        let third = encode_voice_frame(&ambe(), 2, &embedded);
        assert_eq!(third.frame_type, FrameType::Voice);
        let (emb, _) = decode_embedded(&third.burst).unwrap();
        assert_eq!(emb.lcss, Lcss::Continuation);
    }

    #[test]
    fn test_embedded_lc_recovered_from_voice_bursts() {
        let lc = DmrLc::group(7777, 31);
        let embedded = EmbeddedLc::new(&lc);
        let mut collector = EmbeddedLcCollector::new();
        let mut found = None;
        for n in 1..6 {
            let enc = encode_voice_frame(&ambe(), n, &embedded);
            let (emb, fragment) = decode_embedded(&enc.burst).unwrap();
            if let Some(lc) = collector.push(emb.lcss, fragment) {
                found = Some(lc);
            }
        }
        assert_eq!(found, Some(lc));
    }

    #[test]
    fn test_terminator_padding_mid_superframe() {
        let lc = DmrLc::group(1234, 9);
        let bursts = encode_terminator(&lc, 2).unwrap();
        assert_eq!(bursts.len(), 5);

        let ns: Vec<u8> = bursts[..4].iter().map(|b| b.dt_or_n).collect();
        assert_eq!(ns, vec![2, 3, 4, 5]);
        let lcss: Vec<Lcss> = bursts[..4].iter().map(|b| Emb::decode(&b.burst).unwrap().lcss).collect();
        assert_eq!(
            lcss,
            vec![Lcss::Continuation, Lcss::Continuation, Lcss::LastFragment, Lcss::SingleFragment]
        );
        for b in &bursts[..4] {
            assert_eq!(b.frame_type, FrameType::Voice);
            let dec = decode(b.frame_type, b.dt_or_n, &b.burst).unwrap();
            assert_eq!(dec.payload, DmrPayload::Voice(unpack_ambe(&SILENCE_BURST)));
        }

        let term = &bursts[4];
        assert_eq!(term.frame_type, FrameType::DataSync);
        let dec = decode(term.frame_type, term.dt_or_n, &term.burst).unwrap();
        assert_eq!(dec.data_type, Some(DataType::TerminatorWithLc));
        assert_eq!(dec.payload, DmrPayload::Terminator(Some(lc)));
    }

    #[test]
    fn test_terminator_at_boundary_has_no_padding() {
        let bursts = encode_terminator(&DmrLc::group(1, 2), 0).unwrap();
        assert_eq!(bursts.len(), 1);
        assert_eq!(bursts[0].dt_or_n, DataType::TerminatorWithLc.into_raw() as u8);
    }

    #[test]
    fn test_header_decode() {
        let lc = DmrLc::group(42, 9);
        let enc = encode_voice_header(&lc).unwrap();
        let dec = decode(enc.frame_type, enc.dt_or_n, &enc.burst).unwrap();
        assert_eq!(dec.payload, DmrPayload::VoiceHeader(Some(lc)));

        let garbage = decode(FrameType::DataSync, 1, &[0xFF; 33]).unwrap();
        assert_eq!(garbage.payload, DmrPayload::VoiceHeader(None));
        assert!(decode(FrameType::DataSync, 0x0F, &[0; 33]).is_err());
    }
}
