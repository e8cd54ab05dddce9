//! P25D network message header.

use core::fmt;

use dvm_core::{FrameParseErr, RadioId, read_u24, write_u24};

use super::enums::duid::Duid;
use super::{LC_GROUP, LC_PRIVATE, P25_MSG_HDR_SIZE};

pub const P25D_TAG: &[u8; 4] = b"P25D";

/// Control byte flag asking the master for a channel grant
pub const CONTROL_GRANT_DEMAND: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct P25Header {
    pub lco: u8,
    pub src_id: RadioId,
    pub dst_id: RadioId,
    pub sys_id: u16,
    pub control: u8,
    pub mfid: u8,
    /// 24 bits
    pub net_id: u32,
    pub lsd: [u8; 2],
    pub duid: Duid,
    /// Message length: header plus DFSI records
    pub length: u8,
}

impl P25Header {
    /// Group call header as the bridge sends it
    pub fn new(duid: Duid, src_id: RadioId, dst_id: RadioId, grant_demand: bool) -> Self {
        P25Header {
            lco: LC_GROUP,
            src_id,
            dst_id,
            sys_id: 0,
            control: if grant_demand { CONTROL_GRANT_DEMAND } else { 0 },
            mfid: 0,
            net_id: 0,
            lsd: [0, 0],
            duid,
            length: P25_MSG_HDR_SIZE as u8,
        }
    }

    pub fn is_private(&self) -> bool {
        self.lco == LC_PRIVATE
    }

    pub fn grant_demand(&self) -> bool {
        self.control & CONTROL_GRANT_DEMAND != 0
    }

    pub fn to_bytes(&self) -> [u8; P25_MSG_HDR_SIZE] {
        let mut out = [0u8; P25_MSG_HDR_SIZE];
        out[0..4].copy_from_slice(P25D_TAG);
        out[4] = self.lco;
        write_u24(&mut out, 5, self.src_id);
        write_u24(&mut out, 8, self.dst_id);
        out[11..13].copy_from_slice(&self.sys_id.to_be_bytes());
        out[14] = self.control;
        out[15] = self.mfid;
        write_u24(&mut out, 16, self.net_id);
        out[20..22].copy_from_slice(&self.lsd);
        out[22] = self.duid.into_raw() as u8;
        out[23] = self.length;
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameParseErr> {
        dvm_core::expect_len!(data, P25_MSG_HDR_SIZE, "p25d")?;
        if &data[0..4] != P25D_TAG {
            return Err(FrameParseErr::InvalidTag { expected: "P25D" });
        }
        let duid = Duid::try_from(data[22] as u64).map_err(|_| FrameParseErr::InvalidValue {
            field: "duid",
            value: data[22] as u64,
        })?;

        Ok(P25Header {
            lco: data[4],
            src_id: read_u24(data, 5),
            dst_id: read_u24(data, 8),
            sys_id: u16::from_be_bytes([data[11], data[12]]),
            control: data[14],
            mfid: data[15],
            net_id: read_u24(data, 16),
            lsd: [data[20], data[21]],
            duid,
            length: data[23],
        })
    }
}

impl fmt::Display for P25Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P25Header {{ duid: {} lco: {:#04x} src: {} dst: {} control: {:#04x} len: {} }}",
            self.duid, self.lco, self.src_id, self.dst_id, self.control, self.length
        )
    }
}

/// Fixed header of an outbound P25D message
pub fn encode_header(duid: Duid, src_id: RadioId, dst_id: RadioId, grant_demand: bool) -> [u8; P25_MSG_HDR_SIZE] {
    P25Header::new(duid, src_id, dst_id, grant_demand).to_bytes()
}
