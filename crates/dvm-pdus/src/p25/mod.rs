pub mod dfsi;
pub mod enums;
pub mod ldu;
pub mod p25d;

/// Bytes of the P25D message header
pub const P25_MSG_HDR_SIZE: usize = 24;

/// Bytes of a P25D message as sent to the master
pub const P25_PAYLOAD_SIZE: usize = 200;

/// Offset of the frame type byte in a P25D message
pub const P25_FRAME_TYPE_OFFSET: usize = 180;

/// Bytes of one IMBE codeword
pub const IMBE_BUF_LEN: usize = 11;

/// IMBE codewords per LDU
pub const IMBE_PER_LDU: usize = 9;

/// Voice records per call cycle (LDU1 then LDU2)
pub const P25_N_PER_CYCLE: u8 = 18;

/// LCO for group voice
pub const LC_GROUP: u8 = 0x00;
/// LCO for unit to unit voice
pub const LC_PRIVATE: u8 = 0x03;

/// Algorithm ID for clear voice
pub const P25_ALGO_UNENCRYPT: u8 = 0x80;
