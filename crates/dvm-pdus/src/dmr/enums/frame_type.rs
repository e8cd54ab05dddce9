/// Kind of burst announced in byte 15 of a DMRD frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// Voice burst A, carries the audio sync pattern
    VoiceSync,
    /// Voice bursts B..F, carry EMB and an embedded signalling fragment
    Voice,
    /// Data sync burst; the data type says which
    DataSync,
}

impl FrameType {
    /// Flag bits of byte 15, without slot or low nibble
    pub fn flag_bits(self) -> u8 {
        match self {
            FrameType::VoiceSync => 0x10,
            FrameType::Voice => 0x00,
            FrameType::DataSync => 0x20,
        }
    }

    /// Data sync takes precedence when both flags are set
    pub fn from_flags(byte15: u8) -> Self {
        if byte15 & 0x20 != 0 {
            FrameType::DataSync
        } else if byte15 & 0x10 != 0 {
            FrameType::VoiceSync
        } else {
            FrameType::Voice
        }
    }
}

impl core::fmt::Display for FrameType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameType::VoiceSync => write!(f, "VOICE_SYNC"),
            FrameType::Voice => write!(f, "VOICE"),
            FrameType::DataSync => write!(f, "DATA_SYNC"),
        }
    }
}
