//! BPTC (196,96) block product turbo code used by DMR header and terminator bursts.
//!
//! 96 payload bits sit in a 13x15 matrix (plus one reserved bit at index 0).
//! Rows 0..9 carry Hamming (15,11,3), every column Hamming (13,9,3). The
//! matrix is then interleaved with stride 181 and split around the 68 bit
//! middle section of the burst.

use dvm_core::BitBuffer;

use super::hamming::{HAMMING_13_9_3, HAMMING_15_11_3, HammingResult};

const MATRIX_LEN: usize = 196;
const ROWS: usize = 13;
const COLS: usize = 15;
const DATA_ROWS: usize = 9;

/// Burst bit offset of the second half of the coded payload
const SECOND_HALF_OFFSET: usize = 166;
const HALF_LEN: usize = 98;

/// Correction passes before giving up on a damaged matrix
const MAX_PASSES: usize = 5;

/// Matrix positions carrying payload bits, in payload order
fn data_positions() -> impl Iterator<Item = usize> {
    // Row 0 starts with three reserved bits
    (4..=11).chain((1..DATA_ROWS).flat_map(|r| {
        let start = 1 + r * COLS;
        start..start + 11
    }))
}

#[inline]
fn interleave_index(a: usize) -> usize {
    (a * 181) % MATRIX_LEN
}

fn column(matrix: &[u8; MATRIX_LEN], c: usize) -> [u8; ROWS] {
    let mut col = [0u8; ROWS];
    for (a, bit) in col.iter_mut().enumerate() {
        *bit = matrix[1 + c + a * COLS];
    }
    col
}

fn store_column(matrix: &mut [u8; MATRIX_LEN], c: usize, col: &[u8; ROWS]) {
    for (a, bit) in col.iter().enumerate() {
        matrix[1 + c + a * COLS] = *bit;
    }
}

/// Encodes 12 payload bytes into the coded sections of a 33-byte burst.
/// The slot type and sync bits in the middle are left untouched.
pub fn encode(payload: &[u8; 12], burst: &mut [u8]) {
    let mut matrix = [0u8; MATRIX_LEN];
    let mut src = BitBuffer::from_bytes(payload);
    for pos in data_positions() {
        matrix[pos] = src.read_bit().unwrap_or(0);
    }

    for r in 0..DATA_ROWS {
        let start = 1 + r * COLS;
        HAMMING_15_11_3.encode(&mut matrix[start..start + COLS]);
    }
    for c in 0..COLS {
        let mut col = column(&matrix, c);
        HAMMING_13_9_3.encode(&mut col);
        store_column(&mut matrix, c, &col);
    }

    let mut raw = [0u8; MATRIX_LEN];
    for (a, bit) in matrix.iter().enumerate() {
        raw[interleave_index(a)] = *bit;
    }

    let mut out = BitBuffer::from_bytes(burst);
    for &bit in &raw[..HALF_LEN] {
        out.write_bit(bit);
    }
    out.seek(SECOND_HALF_OFFSET);
    for &bit in &raw[HALF_LEN..] {
        out.write_bit(bit);
    }
    burst.copy_from_slice(out.as_bytes());
}

/// Extracts and repairs the 12 payload bytes of a 33-byte burst.
/// Returns the payload and the number of bits flipped during repair.
pub fn decode(burst: &[u8]) -> ([u8; 12], usize) {
    let mut src = BitBuffer::from_bytes(burst);
    let mut raw = [0u8; MATRIX_LEN];
    // Burst length is fixed by the caller, so both halves are present
    let _ = src.to_bitarr(&mut raw[..HALF_LEN]);
    src.seek(SECOND_HALF_OFFSET);
    let _ = src.to_bitarr(&mut raw[HALF_LEN..]);

    let mut matrix = [0u8; MATRIX_LEN];
    for (a, bit) in matrix.iter_mut().enumerate() {
        *bit = raw[interleave_index(a)];
    }

    let mut fixed = 0;
    for _ in 0..MAX_PASSES {
        let mut fixing = false;
        for c in 0..COLS {
            let mut col = column(&matrix, c);
            if let HammingResult::Corrected(_) = HAMMING_13_9_3.decode(&mut col) {
                store_column(&mut matrix, c, &col);
                fixing = true;
                fixed += 1;
            }
        }
        for r in 0..DATA_ROWS {
            let start = 1 + r * COLS;
            if let HammingResult::Corrected(_) = HAMMING_15_11_3.decode(&mut matrix[start..start + COLS]) {
                fixing = true;
                fixed += 1;
            }
        }
        if !fixing {
            break;
        }
    }

    let mut out = BitBuffer::new(96);
    for pos in data_positions() {
        out.write_bit(matrix[pos]);
    }
    let mut payload = [0u8; 12];
    payload.copy_from_slice(out.as_bytes());
    (payload, fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: [u8; 12] = [0x00, 0x10, 0x20, 0x00, 0x00, 0x09, 0x12, 0xD6, 0x87, 0xA1, 0x5C, 0x33];

    #[test]
    fn test_payload_positions_cover_96_bits() {
        let positions: Vec<usize> = data_positions().collect();
        assert_eq!(positions.len(), 96);
        assert_eq!(positions[0], 4);
        assert_eq!(*positions.last().unwrap(), 131);
    }

    #[test]
    fn test_middle_of_burst_untouched() {
        let mut burst = [0xFFu8; 33];
        encode(&PAYLOAD, &mut burst);
        let bb = BitBuffer::from_bytes(&burst);
        assert_eq!(bb.peek_bits_at(98, 64).unwrap(), u64::MAX);
        assert_eq!(bb.peek_bits_at(162, 4).unwrap(), 0xF);
        let (decoded, fixed) = decode(&burst);
        assert_eq!(decoded, PAYLOAD);
        assert_eq!(fixed, 0);
    }

    fn flip_matrix_bit(burst: &mut [u8; 33], a: usize) {
        let raw = interleave_index(a);
        let bit = if raw < HALF_LEN { raw } else { raw - HALF_LEN + SECOND_HALF_OFFSET };
        burst[bit / 8] ^= 0x80 >> (bit % 8);
    }

    #[test]
    fn test_repairs_one_error_per_column() {
        let mut burst = [0u8; 33];
        encode(&PAYLOAD, &mut burst);
        // rows 1, 3, 6 and columns 4, 6, 9
        for a in [20, 52, 100] {
            flip_matrix_bit(&mut burst, a);
        }
        let (decoded, fixed) = decode(&burst);
        assert_eq!(decoded, PAYLOAD);
        assert_eq!(fixed, 3);
    }
}
