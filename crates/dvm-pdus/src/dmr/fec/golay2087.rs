//! Golay (20,8,7) protecting the DMR slot type.
//!
//! Codeword layout is the 8 data bits followed by 12 parity bits: the 11-bit
//! remainder of the Golay (23,12) generator plus a bit making the weight even.

/// x^11 + x^10 + x^6 + x^5 + x^4 + x^2 + 1
const GOLAY_POLY: u32 = 0xC75;

/// 12 parity bits for an 8-bit value
pub fn parity(value: u8) -> u16 {
    let mut rem = (value as u32) << 11;
    for bit in (11..19).rev() {
        if rem & (1 << bit) != 0 {
            rem ^= GOLAY_POLY << (bit - 11);
        }
    }
    let p11 = rem & 0x7FF;
    let weight = value.count_ones() + p11.count_ones();
    ((p11 << 1) | (weight & 1)) as u16
}

/// 20-bit codeword for `value`
pub fn encode(value: u8) -> u32 {
    ((value as u32) << 12) | parity(value) as u32
}

/// Nearest codeword search. Returns the data byte if at most 3 bits are in error.
pub fn decode(codeword: u32) -> Option<u8> {
    let codeword = codeword & 0xFFFFF;
    let (value, distance) = (0..=255u8)
        .map(|v| (v, (encode(v) ^ codeword).count_ones()))
        .min_by_key(|&(_, d)| d)?;
    if distance <= 3 { Some(value) } else { None }
}
