/// DFSI voice record tag, first byte of each record in an LDU
/// Bits: 8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DfsiFrameType {
    Ldu1Voice1 = 0x62,
    Ldu1Voice2 = 0x63,
    Ldu1Voice3 = 0x64,
    Ldu1Voice4 = 0x65,
    Ldu1Voice5 = 0x66,
    Ldu1Voice6 = 0x67,
    Ldu1Voice7 = 0x68,
    Ldu1Voice8 = 0x69,
    Ldu1Voice9 = 0x6A,
    Ldu2Voice10 = 0x6B,
    Ldu2Voice11 = 0x6C,
    Ldu2Voice12 = 0x6D,
    Ldu2Voice13 = 0x6E,
    Ldu2Voice14 = 0x6F,
    Ldu2Voice15 = 0x70,
    Ldu2Voice16 = 0x71,
    Ldu2Voice17 = 0x72,
    Ldu2Voice18 = 0x73,
}

pub const LDU1_RECORDS: [DfsiFrameType; 9] = [
    DfsiFrameType::Ldu1Voice1,
    DfsiFrameType::Ldu1Voice2,
    DfsiFrameType::Ldu1Voice3,
    DfsiFrameType::Ldu1Voice4,
    DfsiFrameType::Ldu1Voice5,
    DfsiFrameType::Ldu1Voice6,
    DfsiFrameType::Ldu1Voice7,
    DfsiFrameType::Ldu1Voice8,
    DfsiFrameType::Ldu1Voice9,
];

pub const LDU2_RECORDS: [DfsiFrameType; 9] = [
    DfsiFrameType::Ldu2Voice10,
    DfsiFrameType::Ldu2Voice11,
    DfsiFrameType::Ldu2Voice12,
    DfsiFrameType::Ldu2Voice13,
    DfsiFrameType::Ldu2Voice14,
    DfsiFrameType::Ldu2Voice15,
    DfsiFrameType::Ldu2Voice16,
    DfsiFrameType::Ldu2Voice17,
    DfsiFrameType::Ldu2Voice18,
];

impl std::convert::TryFrom<u64> for DfsiFrameType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        LDU1_RECORDS
            .iter()
            .chain(LDU2_RECORDS.iter())
            .copied()
            .find(|t| t.into_raw() == x)
            .ok_or(())
    }
}

impl DfsiFrameType {
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    /// Position of this record within its LDU, 0..9
    pub fn index(self) -> usize {
        let raw = self as usize;
        if raw >= DfsiFrameType::Ldu2Voice10 as usize {
            raw - DfsiFrameType::Ldu2Voice10 as usize
        } else {
            raw - DfsiFrameType::Ldu1Voice1 as usize
        }
    }
}

impl From<DfsiFrameType> for u64 {
    fn from(e: DfsiFrameType) -> Self {
        e.into_raw()
    }
}

impl core::fmt::Display for DfsiFrameType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let number = match self.into_raw() {
            x if x >= DfsiFrameType::Ldu2Voice10.into_raw() => x - 0x6B + 10,
            x => x - 0x62 + 1,
        };
        write!(f, "VOICE{}", number)
    }
}
