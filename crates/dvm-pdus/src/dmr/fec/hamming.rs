//! Systematic Hamming codes over bit-per-byte slices.
//!
//! Each code is described by its parity equations: check bit `j` sits at
//! `data_bits + j` and is the XOR of the listed data bit positions.

pub struct HammingCode {
    data_bits: usize,
    equations: &'static [&'static [usize]],
}

/// Hamming (15,11,3), rows of the BPTC (196,96) matrix
pub const HAMMING_15_11_3: HammingCode = HammingCode {
    data_bits: 11,
    equations: &[
        &[0, 1, 2, 3, 5, 7, 8],
        &[1, 2, 3, 4, 6, 8, 9],
        &[2, 3, 4, 5, 7, 9, 10],
        &[0, 1, 2, 4, 6, 7, 10],
    ],
};

/// Hamming (13,9,3), columns of the BPTC (196,96) matrix
pub const HAMMING_13_9_3: HammingCode = HammingCode {
    data_bits: 9,
    equations: &[
        &[0, 1, 3, 5, 6],
        &[0, 1, 2, 4, 6, 7],
        &[0, 1, 2, 3, 5, 7, 8],
        &[0, 2, 4, 5, 8],
    ],
};

/// Hamming (16,11,4), rows of the embedded link control matrix
pub const HAMMING_16_11_4: HammingCode = HammingCode {
    data_bits: 11,
    equations: &[
        &[0, 1, 2, 3, 5, 7, 8],
        &[1, 2, 3, 4, 6, 8, 9],
        &[2, 3, 4, 5, 7, 9, 10],
        &[0, 1, 2, 4, 6, 7, 10],
        &[0, 2, 5, 6, 8, 9, 10],
    ],
};

/// Result of checking one codeword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HammingResult {
    Clean,
    /// A single bit was flipped back at this position
    Corrected(usize),
    Uncorrectable,
}

impl HammingCode {
    /// Codeword length in bits
    pub const fn len(&self) -> usize {
        self.data_bits + self.equations.len()
    }

    /// Fills in the check bits of `bits[..len()]` from its data bits.
    pub fn encode(&self, bits: &mut [u8]) {
        for (j, eq) in self.equations.iter().enumerate() {
            bits[self.data_bits + j] = eq.iter().fold(0, |acc, &i| acc ^ (bits[i] & 1));
        }
    }

    /// Checks `bits[..len()]` and repairs a single bit error in place.
    pub fn decode(&self, bits: &mut [u8]) -> HammingResult {
        let syndrome = self.syndrome(bits);
        if syndrome == 0 {
            return HammingResult::Clean;
        }
        match (0..self.len()).find(|&pos| self.error_pattern(pos) == syndrome) {
            Some(pos) => {
                bits[pos] ^= 1;
                HammingResult::Corrected(pos)
            }
            None => HammingResult::Uncorrectable,
        }
    }

    fn syndrome(&self, bits: &[u8]) -> u32 {
        self.equations.iter().enumerate().fold(0, |acc, (j, eq)| {
            let check = eq.iter().fold(bits[self.data_bits + j] & 1, |c, &i| c ^ (bits[i] & 1));
            acc | ((check as u32) << j)
        })
    }

    /// Syndrome produced by an error at `pos`
    fn error_pattern(&self, pos: usize) -> u32 {
        if pos >= self.data_bits {
            return 1 << (pos - self.data_bits);
        }
        self.equations
            .iter()
            .enumerate()
            .filter(|(_, eq)| eq.contains(&pos))
            .fold(0, |acc, (j, _)| acc | (1 << j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize, seed: u32) -> Vec<u8> {
        (0..len).map(|i| ((seed >> (i % 32)) & 1) as u8).collect()
    }

    #[test]
    fn test_every_single_error_is_repaired() {
        for code in [&HAMMING_15_11_3, &HAMMING_13_9_3, &HAMMING_16_11_4] {
            let mut cw = sample(code.len(), 0x5A3C_96E1);
            code.encode(&mut cw);
            assert_eq!(code.decode(&mut cw.clone()), HammingResult::Clean);
            for pos in 0..code.len() {
                let mut damaged = cw.clone();
                damaged[pos] ^= 1;
                assert_eq!(code.decode(&mut damaged), HammingResult::Corrected(pos));
                assert_eq!(damaged, cw);
            }
        }
    }

    #[test]
    fn test_extended_code_detects_double_errors() {
        let mut cw = sample(16, 0x0000_07A5);
        HAMMING_16_11_4.encode(&mut cw);
        cw[0] ^= 1;
        cw[9] ^= 1;
        assert_eq!(HAMMING_16_11_4.decode(&mut cw), HammingResult::Uncorrectable);
    }
}
