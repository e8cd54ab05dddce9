use const_format::concatcp;
use git_version::git_version;

const GIT_VERSION: &str = git_version!(args = ["--always", "--dirty=-modified"], fallback = "unknown");

/// Version string reported at startup
pub const STACK_VERSION: &str = concatcp!(env!("CARGO_PKG_VERSION"), "-", GIT_VERSION);

/// Random per-call correlation token. 0 means no call.
pub type StreamId = u32;

/// 24-bit radio or talkgroup identifier
pub type RadioId = u32;

/// Largest value that fits the 24-bit address fields of DMR and P25
pub const MAX_RADIO_ID: RadioId = 0x00FF_FFFF;

/// PCM sample rate of every audio endpoint
pub const SAMPLE_RATE: u32 = 8000;

/// Samples per vocoder block (20 ms)
pub const PCM_BLOCK_SAMPLES: usize = 160;

/// Bytes per vocoder block of 16-bit little endian PCM
pub const PCM_BLOCK_BYTES: usize = PCM_BLOCK_SAMPLES * 2;

/// Duration of one PCM block in milliseconds
pub const PCM_BLOCK_MS: u64 = 20;

/// Logical channel a call runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallChannel {
    /// DMR timeslot, 1 or 2
    DmrSlot(u8),
    /// Fixed P25 channel
    P25,
}

impl CallChannel {
    /// Index into the per-channel status array
    pub fn status_index(&self) -> usize {
        match self {
            CallChannel::DmrSlot(1) => 0,
            CallChannel::DmrSlot(_) => 1,
            CallChannel::P25 => 2,
        }
    }
}

impl core::fmt::Display for CallChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CallChannel::DmrSlot(ts) => write!(f, "TS{}", ts),
            CallChannel::P25 => write!(f, "P25"),
        }
    }
}

/// Writes a 24-bit big endian value at `offset`
#[inline]
pub fn write_u24(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset] = (value >> 16) as u8;
    buf[offset + 1] = (value >> 8) as u8;
    buf[offset + 2] = value as u8;
}

/// Reads a 24-bit big endian value at `offset`
#[inline]
pub fn read_u24(buf: &[u8], offset: usize) -> u32 {
    (buf[offset] as u32) << 16 | (buf[offset + 1] as u32) << 8 | buf[offset + 2] as u32
}

/// Hex dump with spaces between bytes, for trace logging
pub fn hex_dump(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 3);
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        s.push_str(&format!("{:02X}", b));
    }
    s
}
