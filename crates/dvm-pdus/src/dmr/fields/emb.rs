use dvm_core::{BitBuffer, FrameParseErr};

use crate::dmr::fec::qr1676;

/// Burst bit offsets of the two 8-bit halves of the EMB codeword
const FIRST_HALF: usize = 108;
const SECOND_HALF: usize = 148;

/// Link control start/stop marking the position of an embedded fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lcss {
    SingleFragment = 0,
    FirstFragment = 1,
    LastFragment = 2,
    Continuation = 3,
}

impl std::convert::TryFrom<u64> for Lcss {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(Lcss::SingleFragment),
            1 => Ok(Lcss::FirstFragment),
            2 => Ok(Lcss::LastFragment),
            3 => Ok(Lcss::Continuation),
            _ => Err(()),
        }
    }
}

impl Lcss {
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

/// Embedded signalling header of voice bursts B..F
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emb {
    pub color_code: u8,
    /// Privacy indicator
    pub pi: bool,
    pub lcss: Lcss,
}

impl Emb {
    pub fn new(lcss: Lcss) -> Self {
        Emb {
            color_code: 0,
            pi: false,
            lcss,
        }
    }

    pub fn encode(&self, burst: &mut [u8]) {
        let value = ((self.color_code & 0x0F) << 3) | ((self.pi as u8) << 2) | self.lcss as u8;
        let codeword = qr1676::encode(value) as u64;

        let mut buffer = BitBuffer::from_bytes(burst);
        buffer.seek(FIRST_HALF);
        buffer.write_bits(codeword >> 8, 8);
        buffer.seek(SECOND_HALF);
        buffer.write_bits(codeword & 0xFF, 8);
        burst.copy_from_slice(buffer.as_bytes());
    }

    pub fn decode(burst: &[u8]) -> Result<Self, FrameParseErr> {
        let buffer = BitBuffer::from_bytes(burst);
        let hi = buffer
            .peek_bits_at(FIRST_HALF, 8)
            .ok_or(FrameParseErr::BufferEnded { field: Some("emb") })?;
        let lo = buffer
            .peek_bits_at(SECOND_HALF, 8)
            .ok_or(FrameParseErr::BufferEnded { field: Some("emb") })?;

        let value = qr1676::decode(((hi << 8) | lo) as u16).ok_or(FrameParseErr::Uncorrectable { field: "emb" })?;
        let lcss = Lcss::try_from((value & 0x03) as u64).map_err(|_| FrameParseErr::InvalidValue {
            field: "lcss",
            value: (value & 0x03) as u64,
        })?;

        Ok(Emb {
            color_code: value >> 3,
            pi: value & 0x04 != 0,
            lcss,
        })
    }
}
