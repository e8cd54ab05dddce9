//! Quadratic residue (16,7,6) protecting the DMR EMB field.
//!
//! Shortened QR (17,9) with an added even parity bit: 7 data bits then 9 parity bits.

/// x^8 + x^5 + x^4 + x^3 + 1
const QR_POLY: u32 = 0x139;

/// 9 parity bits for a 7-bit value
pub fn parity(value: u8) -> u16 {
    let value = value & 0x7F;
    let mut rem = (value as u32) << 8;
    for bit in (8..15).rev() {
        if rem & (1 << bit) != 0 {
            rem ^= QR_POLY << (bit - 8);
        }
    }
    let p8 = rem & 0xFF;
    let weight = value.count_ones() + p8.count_ones();
    ((p8 << 1) | (weight & 1)) as u16
}

/// 16-bit codeword for a 7-bit value
pub fn encode(value: u8) -> u16 {
    (((value & 0x7F) as u16) << 9) | parity(value)
}

/// Nearest codeword search. Returns the 7-bit value if at most 2 bits are in error.
pub fn decode(codeword: u16) -> Option<u8> {
    let (value, distance) = (0..128u8)
        .map(|v| (v, (encode(v) ^ codeword).count_ones()))
        .min_by_key(|&(_, d)| d)?;
    if distance <= 2 { Some(value) } else { None }
}
