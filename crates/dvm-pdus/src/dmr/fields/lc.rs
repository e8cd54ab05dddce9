use core::fmt;

use dvm_core::{BitBuffer, FrameParseErr, RadioId, let_field};

use crate::dmr::enums::flco::Flco;

/// Length of a voice link control word in bytes
pub const LC_BYTES: usize = 9;

/// Voice link control word (ETSI TS 102 361-2, full LC for group and unit to unit voice).
/// Carried by the voice LC header, the terminator and the embedded signalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmrLc {
    /// 1 bit, protect flag
    pub pf: bool,
    /// 6 bits
    pub flco: Flco,
    /// 8 bits, feature set ID; 0 for standard features
    pub fid: u8,
    /// 8 bits, service options
    pub options: u8,
    /// 24 bits
    pub dst_id: RadioId,
    /// 24 bits
    pub src_id: RadioId,
}

impl DmrLc {
    /// Standard group voice LC, as used for every call the bridge originates
    pub fn group(src_id: RadioId, dst_id: RadioId) -> Self {
        DmrLc {
            pf: false,
            flco: Flco::Group,
            fid: 0,
            options: 0,
            dst_id,
            src_id,
        }
    }

    pub fn is_private(&self) -> bool {
        self.flco == Flco::Private
    }

    pub fn from_bitbuf(buffer: &mut BitBuffer) -> Result<Self, FrameParseErr> {
        let pf = buffer.read_field(1, "pf")? != 0;
        // Reserved bit
        buffer.read_field(1, "reserved")?;
        let_field!(buffer, flco, 6);
        let flco = Flco::try_from(flco).map_err(|_| FrameParseErr::InvalidValue { field: "flco", value: flco })?;
        let_field!(buffer, fid, 8);
        let_field!(buffer, options, 8);
        let_field!(buffer, dst_id, 24);
        let_field!(buffer, src_id, 24);

        Ok(DmrLc {
            pf,
            flco,
            fid: fid as u8,
            options: options as u8,
            dst_id: dst_id as RadioId,
            src_id: src_id as RadioId,
        })
    }

    pub fn to_bitbuf(&self, buffer: &mut BitBuffer) {
        buffer.write_bits(self.pf as u64, 1);
        buffer.write_bits(0, 1);
        buffer.write_bits(self.flco.into_raw(), 6);
        buffer.write_bits(self.fid as u64, 8);
        buffer.write_bits(self.options as u64, 8);
        buffer.write_bits(self.dst_id as u64 & 0xFF_FFFF, 24);
        buffer.write_bits(self.src_id as u64 & 0xFF_FFFF, 24);
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameParseErr> {
        dvm_core::expect_len!(bytes, LC_BYTES, "lc")?;
        Self::from_bitbuf(&mut BitBuffer::from_bytes(&bytes[..LC_BYTES]))
    }

    pub fn to_bytes(&self) -> [u8; LC_BYTES] {
        let mut buffer = BitBuffer::new(LC_BYTES * 8);
        self.to_bitbuf(&mut buffer);
        let mut out = [0u8; LC_BYTES];
        out.copy_from_slice(buffer.as_bytes());
        out
    }
}

impl fmt::Display for DmrLc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DmrLc {{ flco: {} pf: {} fid: {:#04x} options: {:#04x} src: {} dst: {} }}",
            self.flco, self.pf, self.fid, self.options, self.src_id, self.dst_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_lc_bytes() {
        let lc = DmrLc::group(0x123456, 9);
        assert_eq!(lc.to_bytes(), [0x00, 0x00, 0x00, 0x00, 0x00, 0x09, 0x12, 0x34, 0x56]);
        assert_eq!(DmrLc::from_bytes(&lc.to_bytes()).unwrap(), lc);
    }

    #[test]
    fn test_private_flco() {
        let bytes = [0x83, 0x10, 0x20, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        let lc = DmrLc::from_bytes(&bytes).unwrap();
        assert!(lc.pf);
        assert!(lc.is_private());
        assert_eq!(lc.fid, 0x10);
        assert_eq!(lc.options, 0x20);
        assert_eq!(lc.dst_id, 256);
        assert_eq!(lc.src_id, 2);
        assert_eq!(lc.to_bytes(), bytes);
    }

    #[test]
    fn test_unknown_flco_rejected() {
        let bytes = [0x30, 0, 0, 0, 0, 1, 0, 0, 1];
        assert_eq!(
            DmrLc::from_bytes(&bytes),
            Err(FrameParseErr::InvalidValue { field: "flco", value: 0x30 })
        );
        assert_eq!(DmrLc::from_bytes(&bytes[..4]), Err(FrameParseErr::BufferEnded { field: Some("lc") }));
    }
}
