use core::fmt;

use dvm_core::{BitBuffer, FrameParseErr, RadioId, let_field};

/// Length of the privacy link control word in bytes, without CRC
pub const PI_LC_BYTES: usize = 10;

/// Privacy indicator header link control: algorithm and message indicator
/// for an encrypted voice call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacyLc {
    /// 1 bit, set for group calls
    pub group: bool,
    /// 3 bits
    pub alg_id: u8,
    /// 8 bits
    pub fid: u8,
    /// 8 bits
    pub key_id: u8,
    /// 32 bits, message indicator
    pub mi: [u8; 4],
    /// 24 bits
    pub dst_id: RadioId,
}

impl PrivacyLc {
    pub fn from_bitbuf(buffer: &mut BitBuffer) -> Result<Self, FrameParseErr> {
        // Reserved
        buffer.read_field(2, "reserved")?;
        let group = buffer.read_field(1, "group")? != 0;
        buffer.read_field(2, "reserved")?;
        let_field!(buffer, alg_id, 3);
        let_field!(buffer, fid, 8);
        let_field!(buffer, key_id, 8);
        let mut mi = [0u8; 4];
        buffer.read_bytes(&mut mi).ok_or(FrameParseErr::BufferEnded { field: Some("mi") })?;
        let_field!(buffer, dst_id, 24);

        Ok(PrivacyLc {
            group,
            alg_id: alg_id as u8,
            fid: fid as u8,
            key_id: key_id as u8,
            mi,
            dst_id: dst_id as RadioId,
        })
    }

    pub fn to_bitbuf(&self, buffer: &mut BitBuffer) {
        buffer.write_bits(0, 2);
        buffer.write_bits(self.group as u64, 1);
        buffer.write_bits(0, 2);
        buffer.write_bits((self.alg_id & 0x07) as u64, 3);
        buffer.write_bits(self.fid as u64, 8);
        buffer.write_bits(self.key_id as u64, 8);
        buffer.write_bytes(&self.mi);
        buffer.write_bits(self.dst_id as u64 & 0xFF_FFFF, 24);
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameParseErr> {
        dvm_core::expect_len!(bytes, PI_LC_BYTES, "pi_lc")?;
        Self::from_bitbuf(&mut BitBuffer::from_bytes(&bytes[..PI_LC_BYTES]))
    }

    pub fn to_bytes(&self) -> [u8; PI_LC_BYTES] {
        let mut buffer = BitBuffer::new(PI_LC_BYTES * 8);
        self.to_bitbuf(&mut buffer);
        let mut out = [0u8; PI_LC_BYTES];
        out.copy_from_slice(buffer.as_bytes());
        out
    }
}

impl fmt::Display for PrivacyLc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PrivacyLc {{ group: {} alg_id: {} fid: {:#04x} key_id: {:#04x} mi: {} dst: {} }}",
            self.group,
            self.alg_id,
            self.fid,
            self.key_id,
            dvm_core::hex_dump(&self.mi),
            self.dst_id
        )
    }
}
