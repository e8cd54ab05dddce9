/// DMR data type carried in the slot type of a data sync burst
/// Bits: 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    VoicePiHeader = 0,
    VoiceLcHeader = 1,
    TerminatorWithLc = 2,
    Csbk = 3,
    MbcHeader = 4,
    MbcContinuation = 5,
    DataHeader = 6,
    Rate12Data = 7,
    Rate34Data = 8,
    Idle = 9,
    Rate1Data = 10,
}

impl std::convert::TryFrom<u64> for DataType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(DataType::VoicePiHeader),
            1 => Ok(DataType::VoiceLcHeader),
            2 => Ok(DataType::TerminatorWithLc),
            3 => Ok(DataType::Csbk),
            4 => Ok(DataType::MbcHeader),
            5 => Ok(DataType::MbcContinuation),
            6 => Ok(DataType::DataHeader),
            7 => Ok(DataType::Rate12Data),
            8 => Ok(DataType::Rate34Data),
            9 => Ok(DataType::Idle),
            10 => Ok(DataType::Rate1Data),
            _ => Err(()),
        }
    }
}

impl DataType {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl From<DataType> for u64 {
    fn from(e: DataType) -> Self {
        e.into_raw()
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DataType::VoicePiHeader => write!(f, "VOICE_PI_HEADER"),
            DataType::VoiceLcHeader => write!(f, "VOICE_LC_HEADER"),
            DataType::TerminatorWithLc => write!(f, "TERMINATOR_WITH_LC"),
            DataType::Csbk => write!(f, "CSBK"),
            DataType::MbcHeader => write!(f, "MBC_HEADER"),
            DataType::MbcContinuation => write!(f, "MBC_CONTINUATION"),
            DataType::DataHeader => write!(f, "DATA_HEADER"),
            DataType::Rate12Data => write!(f, "RATE_12_DATA"),
            DataType::Rate34Data => write!(f, "RATE_34_DATA"),
            DataType::Idle => write!(f, "IDLE"),
            DataType::Rate1Data => write!(f, "RATE_1_DATA"),
        }
    }
}
