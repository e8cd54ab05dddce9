//! Embedded link control carried over voice bursts B..E.
//!
//! The 72 LC bits plus a 5-bit checksum fill a 16x8 bit matrix whose rows are
//! Hamming (16,11,4) protected and whose last row is column parity. The matrix
//! is read out column-wise into four 32-bit fragments.

use dvm_core::BitBuffer;
use tracing::debug;

use crate::dmr::fec::crc::five_bit_checksum;
use crate::dmr::fec::hamming::{HAMMING_16_11_4, HammingResult};
use crate::dmr::fields::emb::Lcss;
use crate::dmr::fields::lc::{DmrLc, LC_BYTES};

const MATRIX_LEN: usize = 128;
const ROW_LEN: usize = 16;
const FRAGMENT_BITS: usize = 32;

/// Burst bit offset of the embedded fragment
const FRAGMENT_OFFSET: usize = 116;

/// Matrix positions of the LC bits, row by row
const LC_SPANS: [(usize, usize); 7] = [(0, 11), (16, 27), (32, 42), (48, 58), (64, 74), (80, 90), (96, 106)];

/// Matrix positions of checksum bits 0..5
const CHECKSUM_POSITIONS: [usize; 5] = [106, 90, 74, 58, 42];

/// Position of matrix bit `a` after interleaving
fn interleave_positions() -> impl Iterator<Item = (usize, usize)> {
    let mut b = 0;
    (0..MATRIX_LEN).map(move |a| {
        let pair = (a, b);
        b += ROW_LEN;
        if b > MATRIX_LEN - 1 {
            b -= MATRIX_LEN - 1;
        }
        pair
    })
}

/// Fully encoded embedded LC, ready to be cut into fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedLc {
    raw: [u8; MATRIX_LEN],
}

impl EmbeddedLc {
    pub fn new(lc: &DmrLc) -> Self {
        let lc_bytes = lc.to_bytes();
        let mut data = [0u8; MATRIX_LEN];

        let mut src = BitBuffer::from_bytes(&lc_bytes);
        for &(start, end) in LC_SPANS.iter() {
            for bit in data[start..end].iter_mut() {
                *bit = src.read_bit().unwrap_or(0);
            }
        }

        let checksum = five_bit_checksum(&lc_bytes);
        for (i, &pos) in CHECKSUM_POSITIONS.iter().enumerate() {
            data[pos] = (checksum >> i) & 1;
        }

        for row in data[..112].chunks_mut(ROW_LEN) {
            HAMMING_16_11_4.encode(row);
        }
        for col in 0..ROW_LEN {
            data[112 + col] = (0..7).fold(0, |acc, row| acc ^ data[col + row * ROW_LEN]);
        }

        let mut raw = [0u8; MATRIX_LEN];
        for (a, b) in interleave_positions() {
            raw[a] = data[b];
        }
        EmbeddedLc { raw }
    }

    /// LCSS and 32-bit fragment for voice burst `n` (1..=4 carry LC; anything else is null)
    pub fn fragment(&self, n: u8) -> (Lcss, u32) {
        let lcss = match n {
            1 => Lcss::FirstFragment,
            2 | 3 => Lcss::Continuation,
            4 => Lcss::LastFragment,
            _ => return (Lcss::SingleFragment, 0),
        };
        let start = (n as usize - 1) * FRAGMENT_BITS;
        let bits = BitBuffer::from_bitarr(&self.raw[start..start + FRAGMENT_BITS])
            .peek_bits_at(0, FRAGMENT_BITS)
            .unwrap_or(0);
        (lcss, bits as u32)
    }
}

pub fn write_fragment(burst: &mut [u8], fragment: u32) {
    let mut buffer = BitBuffer::from_bytes(burst);
    buffer.seek(FRAGMENT_OFFSET);
    buffer.write_bits(fragment as u64, FRAGMENT_BITS);
    burst.copy_from_slice(buffer.as_bytes());
}

pub fn read_fragment(burst: &[u8]) -> Option<u32> {
    BitBuffer::from_bytes(burst)
        .peek_bits_at(FRAGMENT_OFFSET, FRAGMENT_BITS)
        .map(|v| v as u32)
}

/// Reassembles an embedded LC from the fragments of a superframe.
#[derive(Debug, Default)]
pub struct EmbeddedLcCollector {
    raw: Vec<u8>,
}

impl EmbeddedLcCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.raw.clear();
    }

    /// Feeds one fragment. Returns the LC once a first..last run completes and checks out.
    pub fn push(&mut self, lcss: Lcss, fragment: u32) -> Option<DmrLc> {
        match lcss {
            Lcss::SingleFragment => return None,
            Lcss::FirstFragment => self.raw.clear(),
            Lcss::Continuation | Lcss::LastFragment => {
                if self.raw.is_empty() {
                    // Joined mid superframe
                    return None;
                }
            }
        }

        let mut bits = [0u8; FRAGMENT_BITS];
        BitBuffer::from_bytes(&fragment.to_be_bytes()).to_bitarr(&mut bits)?;
        self.raw.extend_from_slice(&bits);

        if lcss != Lcss::LastFragment {
            if self.raw.len() >= MATRIX_LEN {
                self.raw.clear();
            }
            return None;
        }

        let result = if self.raw.len() == MATRIX_LEN { Self::decode(&self.raw) } else { None };
        self.raw.clear();
        result
    }

    fn decode(raw: &[u8]) -> Option<DmrLc> {
        let mut data = [0u8; MATRIX_LEN];
        for (a, b) in interleave_positions() {
            data[b] = raw[a];
        }

        for row in data[..112].chunks_mut(ROW_LEN) {
            if HAMMING_16_11_4.decode(row) == HammingResult::Uncorrectable {
                debug!("embedded LC row uncorrectable");
                return None;
            }
        }

        let mut lc_bits = BitBuffer::new(LC_BYTES * 8);
        for &(start, end) in LC_SPANS.iter() {
            for &bit in data[start..end].iter() {
                lc_bits.write_bit(bit);
            }
        }
        let lc_bytes = lc_bits.into_bytes();

        let checksum = CHECKSUM_POSITIONS
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &pos)| acc | (data[pos] << i));
        if checksum != five_bit_checksum(&lc_bytes) {
            debug!("embedded LC checksum mismatch");
            return None;
        }

        DmrLc::from_bytes(&lc_bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave_is_permutation() {
        let mut seen = [false; MATRIX_LEN];
        for (_, b) in interleave_positions() {
            assert!(!seen[b]);
            seen[b] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_fragment_lcss_sequence() {
        let elc = EmbeddedLc::new(&DmrLc::group(1234, 9));
        let lcss: Vec<Lcss> = (0..6).map(|n| elc.fragment(n).0).collect();
        assert_eq!(
            lcss,
            vec![
                Lcss::SingleFragment,
                Lcss::FirstFragment,
                Lcss::Continuation,
                Lcss::Continuation,
                Lcss::LastFragment,
                Lcss::SingleFragment
            ]
        );
        assert_eq!(elc.fragment(5).1, 0);
        assert_eq!(elc.fragment(0).1, 0);
    }

    #[test]
    fn test_collector_recovers_lc() {
        let lc = DmrLc::group(0x0ABCDE, 31337);
        let elc = EmbeddedLc::new(&lc);
        let mut collector = EmbeddedLcCollector::new();
        let mut result = None;
        for n in 1..=4 {
            let (lcss, frag) = elc.fragment(n);
            result = collector.push(lcss, frag);
        }
        assert_eq!(result, Some(lc));
    }

    #[test]
    fn test_collector_corrects_single_bit_error() {
        let lc = DmrLc::group(5, 9);
        let elc = EmbeddedLc::new(&lc);
        let mut collector = EmbeddedLcCollector::new();
        for n in 1..=3 {
            let (lcss, frag) = elc.fragment(n);
            assert_eq!(collector.push(lcss, frag), None);
        }
        let (lcss, frag) = elc.fragment(4);
        assert_eq!(collector.push(lcss, frag ^ 0x0001_0000), Some(lc));
    }

    #[test]
    fn test_collector_ignores_late_entry() {
        let elc = EmbeddedLc::new(&DmrLc::group(5, 9));
        let mut collector = EmbeddedLcCollector::new();
        for n in 3..=4 {
            let (lcss, frag) = elc.fragment(n);
            assert_eq!(collector.push(lcss, frag), None);
        }
    }
}
