use dvm_core::BitBuffer;

/// Burst bit offset of the 48-bit sync pattern
const SYNC_OFFSET: usize = 108;
const SYNC_BITS: usize = 48;

/// Base station sourced voice sync
pub const BS_AUDIO_SYNC: u64 = 0x755F_D7DF_75F7;
/// Base station sourced data sync
pub const BS_DATA_SYNC: u64 = 0xDFF5_7D75_DF5D;

/// Differing bits tolerated when matching a sync pattern
const SYNC_TOLERANCE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPattern {
    Audio,
    Data,
}

impl SyncPattern {
    pub fn bits(self) -> u64 {
        match self {
            SyncPattern::Audio => BS_AUDIO_SYNC,
            SyncPattern::Data => BS_DATA_SYNC,
        }
    }

    pub fn write(self, burst: &mut [u8]) {
        let mut buffer = BitBuffer::from_bytes(burst);
        buffer.seek(SYNC_OFFSET);
        buffer.write_bits(self.bits(), SYNC_BITS);
        burst.copy_from_slice(buffer.as_bytes());
    }

    /// Identifies the sync pattern in the middle of a burst, if any
    pub fn detect(burst: &[u8]) -> Option<SyncPattern> {
        let found = BitBuffer::from_bytes(burst).peek_bits_at(SYNC_OFFSET, SYNC_BITS)?;
        [SyncPattern::Audio, SyncPattern::Data]
            .into_iter()
            .find(|p| (p.bits() ^ found).count_ones() <= SYNC_TOLERANCE)
    }
}
