pub mod burst;
pub mod codec;
pub mod dmrd;
pub mod enums;
pub mod fec;
pub mod fields;
pub mod full_lc;

/// Bytes in one DMR burst (264 bits)
pub const DMR_FRAME_LENGTH_BYTES: usize = 33;

/// Bytes in a DMRD network frame
pub const DMR_PACKET_SIZE: usize = 55;

/// Bytes of one AMBE codeword
pub const AMBE_BUF_LEN: usize = 9;

/// AMBE codewords carried per voice burst
pub const AMBE_PER_SLOT: usize = 3;

/// Bytes of AMBE carried per voice burst
pub const DMR_AMBE_LENGTH_BYTES: usize = AMBE_BUF_LEN * AMBE_PER_SLOT;

/// Voice bursts per superframe (A..F)
pub const VOICE_FRAMES_PER_SUPERFRAME: u8 = 6;
