//! Full link control carried by data sync bursts: voice LC header, terminator
//! with LC and the privacy indicator header.

use dvm_core::FrameParseErr;
use tracing::debug;

use crate::dmr::DMR_FRAME_LENGTH_BYTES;
use crate::dmr::enums::data_type::DataType;
use crate::dmr::fec::{bptc19696, crc, rs129};
use crate::dmr::fields::lc::{DmrLc, LC_BYTES};
use crate::dmr::fields::privacy_lc::{PI_LC_BYTES, PrivacyLc};
use crate::dmr::fields::slot_type::SlotType;
use crate::dmr::fields::sync::SyncPattern;

/// RS (12,9) parity masks
const VOICE_LC_HEADER_CRC_MASK: u8 = 0x96;
const TERMINATOR_WITH_LC_CRC_MASK: u8 = 0x99;

/// CRC mask of the PI header
const PI_HEADER_CRC_MASK: [u8; 2] = [0x69, 0x69];

fn crc_mask(data_type: DataType) -> Result<u8, FrameParseErr> {
    match data_type {
        DataType::VoiceLcHeader => Ok(VOICE_LC_HEADER_CRC_MASK),
        DataType::TerminatorWithLc => Ok(TERMINATOR_WITH_LC_CRC_MASK),
        other => Err(FrameParseErr::InvalidValue {
            field: "data_type",
            value: other.into_raw(),
        }),
    }
}

/// Builds a complete data sync burst, slot type and sync included, around a BPTC payload
fn build_burst(payload: &[u8; 12], data_type: DataType) -> [u8; DMR_FRAME_LENGTH_BYTES] {
    let mut burst = [0u8; DMR_FRAME_LENGTH_BYTES];
    bptc19696::encode(payload, &mut burst);
    SlotType::new(data_type).encode(&mut burst);
    SyncPattern::Data.write(&mut burst);
    burst
}

/// Encodes `lc` as a voice LC header or terminator burst
pub fn encode(lc: &DmrLc, data_type: DataType) -> Result<[u8; DMR_FRAME_LENGTH_BYTES], FrameParseErr> {
    let mask = crc_mask(data_type)?;
    let lc_bytes = lc.to_bytes();
    let parity = rs129::encode(&lc_bytes);

    let mut payload = [0u8; 12];
    payload[..LC_BYTES].copy_from_slice(&lc_bytes);
    for (dst, p) in payload[LC_BYTES..].iter_mut().zip(parity) {
        *dst = p ^ mask;
    }
    Ok(build_burst(&payload, data_type))
}

/// Decodes the LC of a voice LC header or terminator burst, checking the RS parity
pub fn decode(burst: &[u8], data_type: DataType) -> Result<DmrLc, FrameParseErr> {
    dvm_core::expect_len!(burst, DMR_FRAME_LENGTH_BYTES, "full_lc")?;
    let mask = crc_mask(data_type)?;

    let (mut payload, fixed) = bptc19696::decode(burst);
    if fixed > 0 {
        debug!("full LC: BPTC repaired {} bits", fixed);
    }
    for b in payload[LC_BYTES..].iter_mut() {
        *b ^= mask;
    }
    if !rs129::check(&payload) {
        return Err(FrameParseErr::ChecksumMismatch { field: "full_lc" });
    }
    DmrLc::from_bytes(&payload[..LC_BYTES])
}

/// PI header burst as a transmitting radio would send it
#[cfg(test)]
pub fn encode_pi(pi: &PrivacyLc) -> [u8; DMR_FRAME_LENGTH_BYTES] {
    let lc_bytes = pi.to_bytes();
    let crc = crc::crc_ccitt162(&lc_bytes);

    let mut payload = [0u8; 12];
    payload[..PI_LC_BYTES].copy_from_slice(&lc_bytes);
    payload[PI_LC_BYTES] = (crc >> 8) as u8 ^ PI_HEADER_CRC_MASK[0];
    payload[PI_LC_BYTES + 1] = (crc & 0xFF) as u8 ^ PI_HEADER_CRC_MASK[1];
    build_burst(&payload, DataType::VoicePiHeader)
}

/// Decodes a PI header burst. The boolean is false when the CRC did not match;
/// the decoded LC is returned regardless.
pub fn decode_pi(burst: &[u8]) -> Result<(PrivacyLc, bool), FrameParseErr> {
    dvm_core::expect_len!(burst, DMR_FRAME_LENGTH_BYTES, "pi_lc")?;

    let (payload, _) = bptc19696::decode(burst);
    let crc = crc::crc_ccitt162(&payload[..PI_LC_BYTES]);
    let found = u16::from_be_bytes([
        payload[PI_LC_BYTES] ^ PI_HEADER_CRC_MASK[0],
        payload[PI_LC_BYTES + 1] ^ PI_HEADER_CRC_MASK[1],
    ]);
    let pi = PrivacyLc::from_bytes(&payload[..PI_LC_BYTES])?;
    Ok((pi, crc == found))
}
