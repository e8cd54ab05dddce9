use dvm_core::{BitBuffer, FrameParseErr};

use crate::dmr::enums::data_type::DataType;
use crate::dmr::fec::golay2087;

/// Burst bit offsets of the two 10-bit halves of the slot type codeword
const FIRST_HALF: usize = 98;
const SECOND_HALF: usize = 156;

/// Slot type PDU of a data sync burst: colour code and data type, Golay (20,8) protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotType {
    pub color_code: u8,
    pub data_type: DataType,
}

impl SlotType {
    pub fn new(data_type: DataType) -> Self {
        SlotType { color_code: 0, data_type }
    }

    /// Writes the Golay protected slot type into a 33-byte burst
    pub fn encode(&self, burst: &mut [u8]) {
        let value = ((self.color_code & 0x0F) << 4) | (self.data_type.into_raw() as u8);
        let codeword = golay2087::encode(value) as u64;

        let mut buffer = BitBuffer::from_bytes(burst);
        buffer.seek(FIRST_HALF);
        buffer.write_bits(codeword >> 10, 10);
        buffer.seek(SECOND_HALF);
        buffer.write_bits(codeword & 0x3FF, 10);
        burst.copy_from_slice(buffer.as_bytes());
    }

    pub fn decode(burst: &[u8]) -> Result<Self, FrameParseErr> {
        let buffer = BitBuffer::from_bytes(burst);
        let hi = buffer
            .peek_bits_at(FIRST_HALF, 10)
            .ok_or(FrameParseErr::BufferEnded { field: Some("slot_type") })?;
        let lo = buffer
            .peek_bits_at(SECOND_HALF, 10)
            .ok_or(FrameParseErr::BufferEnded { field: Some("slot_type") })?;

        let value = golay2087::decode(((hi << 10) | lo) as u32)
            .ok_or(FrameParseErr::Uncorrectable { field: "slot_type" })?;
        let raw_type = (value & 0x0F) as u64;
        let data_type = DataType::try_from(raw_type)
            .map_err(|_| FrameParseErr::InvalidValue { field: "data_type", value: raw_type })?;

        Ok(SlotType {
            color_code: value >> 4,
            data_type,
        })
    }
}
