//! Chunking between PCM, vocoder codewords and the frame staging structures.

use dvm_core::PCM_BLOCK_SAMPLES;
use dvm_pdus::dmr::{AMBE_BUF_LEN, AMBE_PER_SLOT, DMR_AMBE_LENGTH_BYTES};
use dvm_pdus::p25::IMBE_PER_LDU;
use dvm_pdus::p25::enums::duid::Duid;

/// Re-blocks PCM of arbitrary length into vocoder-sized blocks
#[derive(Debug, Default)]
pub struct PcmBlocker {
    pending: Vec<i16>,
}

impl PcmBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends samples and drains every complete block
    pub fn push(&mut self, samples: &[i16]) -> Vec<Vec<i16>> {
        self.pending.extend_from_slice(samples);
        let complete = self.pending.len() / PCM_BLOCK_SAMPLES * PCM_BLOCK_SAMPLES;
        let blocks = self.pending[..complete]
            .chunks_exact(PCM_BLOCK_SAMPLES)
            .map(|c| c.to_vec())
            .collect();
        self.pending.drain(..complete);
        blocks
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Collects three AMBE codewords for one DMR voice burst
#[derive(Debug, Default)]
pub struct AmbeStaging {
    buf: [u8; DMR_AMBE_LENGTH_BYTES],
    count: usize,
}

impl AmbeStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a codeword; yields the burst payload when the third lands
    pub fn push(&mut self, codeword: &[u8]) -> Option<[u8; DMR_AMBE_LENGTH_BYTES]> {
        let offset = self.count * AMBE_BUF_LEN;
        self.buf[offset..offset + AMBE_BUF_LEN].copy_from_slice(&codeword[..AMBE_BUF_LEN]);
        self.count += 1;
        if self.count < AMBE_PER_SLOT {
            return None;
        }
        self.count = 0;
        let out = self.buf;
        self.buf = [0; DMR_AMBE_LENGTH_BYTES];
        Some(out)
    }

    pub fn staged(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.buf = [0; DMR_AMBE_LENGTH_BYTES];
    }
}

/// Splits a burst payload into its three codewords
pub fn split_ambe(ambe: &[u8; DMR_AMBE_LENGTH_BYTES]) -> [[u8; AMBE_BUF_LEN]; AMBE_PER_SLOT] {
    let mut out = [[0u8; AMBE_BUF_LEN]; AMBE_PER_SLOT];
    for (dst, src) in out.iter_mut().zip(ambe.chunks_exact(AMBE_BUF_LEN)) {
        dst.copy_from_slice(src);
    }
    out
}

/// LDU and codeword slot that voice index `p25_n` (0..18) belongs to
pub fn ldu_slot(p25_n: u8) -> (Duid, usize) {
    let n = p25_n as usize;
    if n < IMBE_PER_LDU {
        (Duid::Ldu1, n)
    } else {
        (Duid::Ldu2, n - IMBE_PER_LDU)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocker_reblocks() {
        let mut b = PcmBlocker::new();
        assert!(b.push(&[1; 100]).is_empty());
        let blocks = b.push(&[2; 250]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0][99], 1);
        assert_eq!(blocks[0][100], 2);
        assert_eq!(b.pending(), 30);
    }

    #[test]
    fn test_ambe_staging_fires_on_third() {
        let mut s = AmbeStaging::new();
        assert_eq!(s.push(&[1; 9]), None);
        assert_eq!(s.push(&[2; 9]), None);
        let full = s.push(&[3; 9]).unwrap();
        assert_eq!(split_ambe(&full), [[1; 9], [2; 9], [3; 9]]);
        assert_eq!(s.staged(), 0);
    }

    #[test]
    fn test_ldu_slot() {
        assert_eq!(ldu_slot(0), (Duid::Ldu1, 0));
        assert_eq!(ldu_slot(8), (Duid::Ldu1, 8));
        assert_eq!(ldu_slot(9), (Duid::Ldu2, 0));
        assert_eq!(ldu_slot(17), (Duid::Ldu2, 8));
    }
}
