//! DFSI voice records: one IMBE codeword plus the auxiliary bytes of its
//! position in the LDU.

use dvm_core::{RadioId, write_u24};

use super::enums::dfsi_frame_type::DfsiFrameType;
use super::{IMBE_BUF_LEN, LC_GROUP, P25_ALGO_UNENCRYPT};

/// Largest record, VOICE1/VOICE10
pub const MAX_RECORD_LEN: usize = 22;

/// Link control values written into the LDU1 records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LduContext {
    pub lco: u8,
    pub mfid: u8,
    pub service_options: u8,
    pub src_id: RadioId,
    pub dst_id: RadioId,
    pub key_id: u16,
}

impl LduContext {
    pub fn group(src_id: RadioId, dst_id: RadioId) -> Self {
        LduContext {
            lco: LC_GROUP,
            mfid: 0,
            service_options: 0,
            src_id,
            dst_id,
            key_id: 0,
        }
    }
}

impl DfsiFrameType {
    /// Record length in bytes, tag included
    pub fn record_len(self) -> usize {
        use DfsiFrameType::*;
        match self {
            Ldu1Voice1 | Ldu2Voice10 => 22,
            Ldu1Voice2 | Ldu2Voice11 => 14,
            Ldu1Voice9 | Ldu2Voice18 => 16,
            _ => 17,
        }
    }

    /// Offset of the IMBE codeword within the record
    pub fn imbe_offset(self) -> usize {
        use DfsiFrameType::*;
        match self {
            Ldu1Voice1 | Ldu2Voice10 => 10,
            Ldu1Voice2 | Ldu2Voice11 => 1,
            Ldu1Voice9 | Ldu2Voice18 => 4,
            _ => 5,
        }
    }
}

/// Writes one record into `out[..kind.record_len()]` and returns its length
pub fn encode_record(kind: DfsiFrameType, imbe: &[u8], ctx: &LduContext, out: &mut [u8]) -> usize {
    use DfsiFrameType::*;

    let len = kind.record_len();
    let record = &mut out[..len];
    record.fill(0);
    record[0] = kind.into_raw() as u8;

    match kind {
        Ldu1Voice3 => {
            record[1] = ctx.lco;
            record[2] = ctx.mfid;
            record[3] = ctx.service_options;
        }
        Ldu1Voice4 => write_u24(record, 1, ctx.dst_id),
        Ldu1Voice5 => write_u24(record, 1, ctx.src_id),
        Ldu2Voice15 => {
            record[1] = P25_ALGO_UNENCRYPT;
            record[2..4].copy_from_slice(&ctx.key_id.to_be_bytes());
        }
        // RSSI, RS parity, message indicator and LSD bytes stay zero
        _ => {}
    }

    let offset = kind.imbe_offset();
    record[offset..offset + IMBE_BUF_LEN].copy_from_slice(&imbe[..IMBE_BUF_LEN]);
    len
}

/// Copies the IMBE codeword out of an encoded record
pub fn extract_imbe(kind: DfsiFrameType, record: &[u8]) -> [u8; IMBE_BUF_LEN] {
    let offset = kind.imbe_offset();
    let mut imbe = [0u8; IMBE_BUF_LEN];
    imbe.copy_from_slice(&record[offset..offset + IMBE_BUF_LEN]);
    imbe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::p25::enums::dfsi_frame_type::{LDU1_RECORDS, LDU2_RECORDS};

    const IMBE: [u8; 11] = [0x04, 0x0C, 0xFD, 0x7B, 0xFB, 0x7D, 0xF2, 0x7B, 0x3D, 0x9E, 0x45];

    #[test]
    fn test_every_kind_recovers_imbe() {
        let ctx = LduContext::group(1234567, 9);
        for kind in LDU1_RECORDS.iter().chain(LDU2_RECORDS.iter()).copied() {
            let mut out = [0xEEu8; MAX_RECORD_LEN];
            let len = encode_record(kind, &IMBE, &ctx, &mut out);
            assert_eq!(len, kind.record_len());
            assert_eq!(out[0], kind.into_raw() as u8);
            assert_eq!(extract_imbe(kind, &out[..len]), IMBE, "{}", kind);
            assert!(kind.imbe_offset() + IMBE_BUF_LEN <= len);
        }
    }

    #[test]
    fn test_ldu1_aux_fields() {
        let ctx = LduContext::group(0x123456, 0x00ABCD);
        let mut out = [0u8; MAX_RECORD_LEN];

        encode_record(DfsiFrameType::Ldu1Voice3, &IMBE, &ctx, &mut out);
        assert_eq!(&out[1..5], &[LC_GROUP, 0, 0, 0]);

        encode_record(DfsiFrameType::Ldu1Voice4, &IMBE, &ctx, &mut out);
        assert_eq!(&out[1..4], &[0x00, 0xAB, 0xCD]);

        encode_record(DfsiFrameType::Ldu1Voice5, &IMBE, &ctx, &mut out);
        assert_eq!(&out[1..4], &[0x12, 0x34, 0x56]);

        encode_record(DfsiFrameType::Ldu1Voice1, &IMBE, &ctx, &mut out);
        assert_eq!(&out[1..10], &[0; 9]);
    }

    #[test]
    fn test_ldu2_algorithm_record() {
        let mut ctx = LduContext::group(1, 2);
        ctx.key_id = 0x0102;
        let mut out = [0u8; MAX_RECORD_LEN];
        encode_record(DfsiFrameType::Ldu2Voice15, &IMBE, &ctx, &mut out);
        assert_eq!(&out[..5], &[0x70, 0x80, 0x01, 0x02, 0x00]);
    }
}
