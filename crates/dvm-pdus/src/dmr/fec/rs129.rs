//! Reed-Solomon (12,9) over GF(2^8) protecting full link control.
//!
//! Only parity generation and a recompute-and-compare check are needed: the
//! LC is accepted or rejected, never corrected.

/// x^8 + x^4 + x^3 + x^2 + 1
const GF_POLY: u16 = 0x11D;

/// (x + a)(x + a^2)(x + a^3), low order coefficients first; x^3 is implicit
const GENERATOR: [u8; 3] = [0x40, 0x38, 0x0E];

pub const LC_LENGTH: usize = 9;
pub const PARITY_LENGTH: usize = 3;

fn gf_mul(a: u8, b: u8) -> u8 {
    let mut a = a as u16;
    let mut b = b;
    let mut product = 0u16;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a <<= 1;
        if a & 0x100 != 0 {
            a ^= GF_POLY;
        }
        b >>= 1;
    }
    product as u8
}

/// Parity bytes for `lc`, in transmission order
pub fn encode(lc: &[u8; LC_LENGTH]) -> [u8; PARITY_LENGTH] {
    let mut reg = [0u8; PARITY_LENGTH];
    for &byte in lc {
        let feedback = byte ^ reg[2];
        reg[2] = reg[1] ^ gf_mul(GENERATOR[2], feedback);
        reg[1] = reg[0] ^ gf_mul(GENERATOR[1], feedback);
        reg[0] = gf_mul(GENERATOR[0], feedback);
    }
    [reg[2], reg[1], reg[0]]
}

/// True if the trailing parity matches the leading 9 bytes
pub fn check(data: &[u8; LC_LENGTH + PARITY_LENGTH]) -> bool {
    let mut lc = [0u8; LC_LENGTH];
    lc.copy_from_slice(&data[..LC_LENGTH]);
    encode(&lc) == data[LC_LENGTH..]
}
