//! LDU staging buffers and their DFSI encoding inside a P25D message.
//!
//! A staging buffer holds the nine voice records of one LDU at 25-byte
//! strides, the same layout whether it was filled by the vocoder (TX) or
//! copied out of a received message (RX).

use dvm_core::FrameParseErr;

use super::dfsi::{LduContext, encode_record, extract_imbe};
use super::enums::dfsi_frame_type::{DfsiFrameType, LDU1_RECORDS, LDU2_RECORDS};
use super::enums::duid::Duid;
use super::p25d::P25Header;
use super::{IMBE_BUF_LEN, IMBE_PER_LDU, P25_FRAME_TYPE_OFFSET, P25_MSG_HDR_SIZE, P25_PAYLOAD_SIZE};

/// Stride of one voice record in the staging buffer
const RECORD_STRIDE: usize = 25;

/// Bytes in an LDU staging buffer
pub const LDU_BUF_LEN: usize = IMBE_PER_LDU * RECORD_STRIDE;


/// Total DFSI record bytes of one LDU
const LDU_RECORDS_LEN: usize = 154;

fn records_for(duid: Duid) -> Option<&'static [DfsiFrameType; IMBE_PER_LDU]> {
    match duid {
        Duid::Ldu1 => Some(&LDU1_RECORDS),
        Duid::Ldu2 => Some(&LDU2_RECORDS),
        _ => None,
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct LduBuffer {
    data: [u8; LDU_BUF_LEN],
}

impl Default for LduBuffer {
    fn default() -> Self {
        LduBuffer { data: [0; LDU_BUF_LEN] }
    }
}

impl LduBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Stores codeword `slot` (0..9) of this LDU. LDU1 and LDU2 records
    /// place their codewords at the same offsets.
    pub fn set_imbe(&mut self, slot: usize, imbe: &[u8]) {
        let offset = slot * RECORD_STRIDE + LDU1_RECORDS[slot].imbe_offset();
        self.data[offset..offset + IMBE_BUF_LEN].copy_from_slice(&imbe[..IMBE_BUF_LEN]);
    }

    pub fn imbe(&self, slot: usize) -> [u8; IMBE_BUF_LEN] {
        extract_imbe(LDU1_RECORDS[slot], self.record(slot))
    }

    fn record(&self, slot: usize) -> &[u8] {
        &self.data[slot * RECORD_STRIDE..(slot + 1) * RECORD_STRIDE]
    }

    pub fn as_bytes(&self) -> &[u8; LDU_BUF_LEN] {
        &self.data
    }
}

impl core::fmt::Debug for LduBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "LduBuffer {{ {} }}", dvm_core::hex_dump(&self.data))
    }
}

/// Encodes the nine records of `ldu` after a P25D header. Returns the full
/// 200-byte message; the header length byte holds the header plus record bytes.
pub fn assemble_ldu(
    duid: Duid,
    ldu: &LduBuffer,
    ctx: &LduContext,
) -> Result<[u8; P25_PAYLOAD_SIZE], FrameParseErr> {
    let records = records_for(duid).ok_or(FrameParseErr::InvalidValue {
        field: "duid",
        value: duid.into_raw(),
    })?;

    let mut out = [0u8; P25_PAYLOAD_SIZE];
    let mut count = P25_MSG_HDR_SIZE;
    for (slot, kind) in records.iter().enumerate() {
        count += encode_record(*kind, &ldu.imbe(slot), ctx, &mut out[count..]);
    }

    let mut header = P25Header::new(duid, ctx.src_id, ctx.dst_id, false);
    header.lco = ctx.lco;
    header.length = count as u8;
    out[..P25_MSG_HDR_SIZE].copy_from_slice(&header.to_bytes());
    out[P25_FRAME_TYPE_OFFSET] = 0;
    Ok(out)
}

/// Complete TDU message, optionally demanding a grant
pub fn assemble_tdu(src_id: u32, dst_id: u32, grant_demand: bool) -> [u8; P25_PAYLOAD_SIZE] {
    let mut out = [0u8; P25_PAYLOAD_SIZE];
    out[..P25_MSG_HDR_SIZE].copy_from_slice(&P25Header::new(Duid::Tdu, src_id, dst_id, grant_demand).to_bytes());
    out
}

/// Validates the record tags of a received LDU and copies the records into a
/// staging buffer. A tag mismatch abandons the whole LDU.
pub fn decode_ldu(duid: Duid, message: &[u8]) -> Result<LduBuffer, FrameParseErr> {
    let records = records_for(duid).ok_or(FrameParseErr::InvalidValue {
        field: "duid",
        value: duid.into_raw(),
    })?;

    dvm_core::expect_len!(message, P25_MSG_HDR_SIZE, "p25d")?;
    let length = message[23] as usize;
    if length < P25_MSG_HDR_SIZE + LDU_RECORDS_LEN {
        return Err(FrameParseErr::InconsistentLength {
            expected: P25_MSG_HDR_SIZE + LDU_RECORDS_LEN,
            found: length,
        });
    }
    dvm_core::expect_len!(message, length, "dfsi_records")?;
    let data = &message[P25_MSG_HDR_SIZE..length];

    let mut offset = 0;
    for kind in records.iter() {
        if data[offset] != kind.into_raw() as u8 {
            return Err(FrameParseErr::InvalidTag {
                expected: if duid == Duid::Ldu1 { "LDU1 voice record" } else { "LDU2 voice record" },
            });
        }
        offset += kind.record_len();
    }

    let mut ldu = LduBuffer::new();
    let mut offset = 0;
    for kind in records.iter() {
        let len = kind.record_len();
        let dst = kind.index() * RECORD_STRIDE;
        ldu.data[dst..dst + len].copy_from_slice(&data[offset..offset + len]);
        offset += len;
    }
    Ok(ldu)
}

/// Decodes a received P25D message: the header, plus the voice records for LDU1/LDU2
pub fn decode_message(message: &[u8]) -> Result<(P25Header, Option<LduBuffer>), FrameParseErr> {
    let header = P25Header::from_bytes(message)?;
    let ldu = if header.duid.is_voice() {
        Some(decode_ldu(header.duid, message)?)
    } else {
        None
    };
    Ok((header, ldu))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codeword(slot: usize) -> [u8; IMBE_BUF_LEN] {
        core::array::from_fn(|i| (slot * 16 + i) as u8 | 0x80)
    }

    fn filled() -> LduBuffer {
        let mut ldu = LduBuffer::new();
        for slot in 0..IMBE_PER_LDU {
            ldu.set_imbe(slot, &codeword(slot));
        }
        ldu
    }

    #[test]
    fn test_record_offsets_and_length() {
        let ctx = LduContext::group(1234, 9);
        let msg = assemble_ldu(Duid::Ldu1, &filled(), &ctx).unwrap();
        assert_eq!(msg[23], 178);
        assert_eq!(msg[22], 0x05);
        let starts: Vec<usize> = [24, 46, 60, 77, 94, 111, 128, 145, 162].to_vec();
        for (i, &start) in starts.iter().enumerate() {
            assert_eq!(msg[start], 0x62 + i as u8);
        }
        // VOICE1 IMBE sits 10 bytes into the first record
        assert_eq!(&msg[34..45], &codeword(0));
        // VOICE9 IMBE sits 4 bytes into the last record
        assert_eq!(&msg[166..177], &codeword(8));
    }

    #[test]
    fn test_staging_offsets() {
        let ldu = filled();
        let offsets = [10, 26, 55, 80, 105, 130, 155, 180, 204];
        for (slot, &offset) in offsets.iter().enumerate() {
            assert_eq!(&ldu.as_bytes()[offset..offset + IMBE_BUF_LEN], &codeword(slot));
        }
    }

    #[test]
    fn test_ldu_round_trip() {
        let ctx = LduContext::group(1234, 9);
        for duid in [Duid::Ldu1, Duid::Ldu2] {
            let msg = assemble_ldu(duid, &filled(), &ctx).unwrap();
            let ldu = decode_ldu(duid, &msg).unwrap();
            for slot in 0..IMBE_PER_LDU {
                assert_eq!(ldu.imbe(slot), codeword(slot));
            }
        }
    }

    #[test]
    fn test_tag_mismatch_drops_ldu() {
        let ctx = LduContext::group(1234, 9);
        let mut msg = assemble_ldu(Duid::Ldu1, &filled(), &ctx).unwrap();
        msg[77] = 0x00;
        assert_eq!(
            decode_ldu(Duid::Ldu1, &msg),
            Err(FrameParseErr::InvalidTag { expected: "LDU1 voice record" })
        );

        let ldu2 = assemble_ldu(Duid::Ldu2, &filled(), &ctx).unwrap();
        assert!(decode_ldu(Duid::Ldu1, &ldu2).is_err());
    }

    #[test]
    fn test_short_message_rejected() {
        let ctx = LduContext::group(1234, 9);
        let msg = assemble_ldu(Duid::Ldu2, &filled(), &ctx).unwrap();
        assert_eq!(
            decode_ldu(Duid::Ldu2, &msg[..100]),
            Err(FrameParseErr::BufferEnded { field: Some("dfsi_records") })
        );
        assert!(assemble_ldu(Duid::Tdu, &filled(), &ctx).is_err());
    }

    #[test]
    fn test_decode_message() {
        let ctx = LduContext::group(1234, 9);
        let msg = assemble_ldu(Duid::Ldu2, &filled(), &ctx).unwrap();
        let (header, ldu) = decode_message(&msg).unwrap();
        assert_eq!(header.duid, Duid::Ldu2);
        assert_eq!(header.src_id, 1234);
        assert_eq!(ldu.unwrap().imbe(4), codeword(4));

        let (header, ldu) = decode_message(&assemble_tdu(1, 2, false)).unwrap();
        assert_eq!(header.duid, Duid::Tdu);
        assert!(ldu.is_none());
    }

    #[test]
    fn test_tdu_message() {
        let msg = assemble_tdu(5, 9, true);
        assert_eq!(msg[22], 0x03);
        assert_eq!(msg[23], 24);
        assert_eq!(msg[14], 0x80);
        assert!(msg[24..].iter().all(|&b| b == 0));
    }
}
