//! AMBE placement inside a 33-byte voice burst.
//!
//! Three 72-bit AMBE codewords occupy bits 0..108 and 156..264. The middle
//! 48 bits carry either the audio sync or EMB plus an embedded fragment.

use super::{AMBE_BUF_LEN, DMR_AMBE_LENGTH_BYTES, DMR_FRAME_LENGTH_BYTES};

/// Voice burst carrying three silence AMBE codewords and a blank middle section
pub const SILENCE_BURST: [u8; DMR_FRAME_LENGTH_BYTES] = [
    0xB9, 0xE8, 0x81, 0x52, 0x61, 0x73, 0x00, 0x2A, 0x6B, 0xB9, 0xE8, 0x81, 0x52, 0x60, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x01, 0x73, 0x00, 0x2A, 0x6B, 0xB9, 0xE8, 0x81, 0x52, 0x61, 0x73, 0x00, 0x2A, 0x6B,
];

/// One silence AMBE codeword
pub const SILENCE_AMBE: [u8; AMBE_BUF_LEN] = [0xB9, 0xE8, 0x81, 0x52, 0x61, 0x73, 0x00, 0x2A, 0x6B];

/// Spreads 27 AMBE bytes around the middle section of `burst`. Bits 108..156 are preserved.
pub fn pack_ambe(ambe: &[u8; DMR_AMBE_LENGTH_BYTES], burst: &mut [u8]) {
    burst[..13].copy_from_slice(&ambe[..13]);
    burst[13] = (burst[13] & 0x0F) | (ambe[13] & 0xF0);
    burst[19] = (burst[19] & 0xF0) | (ambe[13] & 0x0F);
    burst[20..33].copy_from_slice(&ambe[14..27]);
}

/// Inverse of [`pack_ambe`]
pub fn unpack_ambe(burst: &[u8]) -> [u8; DMR_AMBE_LENGTH_BYTES] {
    let mut ambe = [0u8; DMR_AMBE_LENGTH_BYTES];
    ambe[..13].copy_from_slice(&burst[..13]);
    ambe[13] = (burst[13] & 0xF0) | (burst[19] & 0x0F);
    ambe[14..27].copy_from_slice(&burst[20..33]);
    ambe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_burst_holds_silence_codewords() {
        let ambe = unpack_ambe(&SILENCE_BURST);
        for chunk in ambe.chunks(AMBE_BUF_LEN) {
            assert_eq!(chunk, SILENCE_AMBE);
        }
    }

    #[test]
    fn test_pack_preserves_middle() {
        let ambe: [u8; 27] = core::array::from_fn(|i| (i as u8).wrapping_mul(37).wrapping_add(1));
        let mut burst = [0xA5u8; 33];
        pack_ambe(&ambe, &mut burst);
        assert_eq!(burst[13] & 0x0F, 0x05);
        assert_eq!(&burst[14..19], &[0xA5; 5]);
        assert_eq!(burst[19] & 0xF0, 0xA0);
        assert_eq!(unpack_ambe(&burst), ambe);
    }
}
