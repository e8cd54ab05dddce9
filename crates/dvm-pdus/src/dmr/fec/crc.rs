//! Checksums used by DMR link control.

/// CRC-16 ITU-T generator polynomial
pub const GEN_POLY: u16 = 0x1021;

#[inline]
pub fn get_nth_bit(input: &[u8], bit: usize) -> u16 {
    ((input[bit / 8] >> (7 - (bit % 8))) & 1) as u16
}

/// CRC-16 ITU-T over a byte stream, processing `number_bits` bits (MSB first).
/// `crc` is the initial CRC value.
pub fn crc16_itut_bytes(mut crc: u16, input: &[u8], number_bits: usize) -> u16 {
    for i in 0..number_bits {
        crc ^= get_nth_bit(input, i) << 15;
        crc = if crc & 0x8000 != 0 { (crc << 1) ^ GEN_POLY } else { crc << 1 };
    }
    crc
}

/// CRC-CCITT as carried in the PI header: zero preset, inverted result.
pub fn crc_ccitt162(input: &[u8]) -> u16 {
    !crc16_itut_bytes(0, input, input.len() * 8)
}

/// Five bit checksum protecting embedded link control: byte sum modulo 31.
pub fn five_bit_checksum(lc: &[u8]) -> u8 {
    (lc.iter().map(|&b| b as u32).sum::<u32>() % 31) as u8
}
