//! DMRD network frame exchanged with the FNE master.

use core::fmt;

use dvm_core::{FrameParseErr, RadioId, StreamId, read_u24, write_u24};

use super::enums::data_type::DataType;
use super::enums::frame_type::FrameType;
use super::{DMR_FRAME_LENGTH_BYTES, DMR_PACKET_SIZE};

pub const DMRD_TAG: &[u8; 4] = b"DMRD";

/// Offset of the 33-byte burst inside the frame
pub const DMR_BURST_OFFSET: usize = 20;

const SLOT_FLAG: u8 = 0x80;
const PRIVATE_FLAG: u8 = 0x40;

#[derive(Clone, PartialEq, Eq)]
pub struct DmrdFrame {
    pub seq_no: u8,
    pub src_id: RadioId,
    pub dst_id: RadioId,
    pub peer_id: u32,
    /// 1 or 2
    pub slot: u8,
    pub private_call: bool,
    pub frame_type: FrameType,
    /// Data type for data sync bursts, voice index `n` otherwise
    pub dt_or_n: u8,
    pub stream_id: StreamId,
    pub burst: [u8; DMR_FRAME_LENGTH_BYTES],
    pub ber: u8,
    pub rssi: u8,
}

impl DmrdFrame {
    /// Data type carried in the low nibble, for data sync frames
    pub fn data_type(&self) -> Option<DataType> {
        match self.frame_type {
            FrameType::DataSync => DataType::try_from(self.dt_or_n as u64).ok(),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> [u8; DMR_PACKET_SIZE] {
        let mut out = [0u8; DMR_PACKET_SIZE];
        out[0..4].copy_from_slice(DMRD_TAG);
        out[4] = self.seq_no;
        write_u24(&mut out, 5, self.src_id);
        write_u24(&mut out, 8, self.dst_id);
        out[11..15].copy_from_slice(&self.peer_id.to_be_bytes());

        let mut flags = self.frame_type.flag_bits() | (self.dt_or_n & 0x0F);
        if self.slot == 2 {
            flags |= SLOT_FLAG;
        }
        if self.private_call {
            flags |= PRIVATE_FLAG;
        }
        out[15] = flags;

        out[16..20].copy_from_slice(&self.stream_id.to_be_bytes());
        out[DMR_BURST_OFFSET..DMR_BURST_OFFSET + DMR_FRAME_LENGTH_BYTES].copy_from_slice(&self.burst);
        out[53] = self.ber;
        out[54] = self.rssi;
        out
    }

    /// Frames of 53 bytes (without BER/RSSI) are accepted.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameParseErr> {
        dvm_core::expect_len!(data, DMR_BURST_OFFSET + DMR_FRAME_LENGTH_BYTES, "dmrd")?;
        if &data[0..4] != DMRD_TAG {
            return Err(FrameParseErr::InvalidTag { expected: "DMRD" });
        }

        let flags = data[15];
        let mut burst = [0u8; DMR_FRAME_LENGTH_BYTES];
        burst.copy_from_slice(&data[DMR_BURST_OFFSET..DMR_BURST_OFFSET + DMR_FRAME_LENGTH_BYTES]);

        Ok(DmrdFrame {
            seq_no: data[4],
            src_id: read_u24(data, 5),
            dst_id: read_u24(data, 8),
            peer_id: u32::from_be_bytes([data[11], data[12], data[13], data[14]]),
            slot: if flags & SLOT_FLAG != 0 { 2 } else { 1 },
            private_call: flags & PRIVATE_FLAG != 0,
            frame_type: FrameType::from_flags(flags),
            dt_or_n: flags & 0x0F,
            stream_id: u32::from_be_bytes([data[16], data[17], data[18], data[19]]),
            burst,
            ber: data.get(53).copied().unwrap_or(0),
            rssi: data.get(54).copied().unwrap_or(0),
        })
    }
}

impl fmt::Debug for DmrdFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DmrdFrame {{ seq: {} src: {} dst: {} slot: {} {} {} stream: {:08X} }}",
            self.seq_no, self.src_id, self.dst_id, self.slot, self.frame_type, self.dt_or_n, self.stream_id
        )
    }
}
