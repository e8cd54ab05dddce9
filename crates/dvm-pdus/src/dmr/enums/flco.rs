/// Full link control opcode
/// Bits: 6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flco {
    /// Group voice channel user
    Group = 0x00,
    /// Unit to unit voice channel user
    Private = 0x03,
}

impl std::convert::TryFrom<u64> for Flco {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0x00 => Ok(Flco::Group),
            0x03 => Ok(Flco::Private),
            _ => Err(()),
        }
    }
}

impl Flco {
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl From<Flco> for u64 {
    fn from(e: Flco) -> Self {
        e.into_raw()
    }
}

impl core::fmt::Display for Flco {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Flco::Group => write!(f, "Group"),
            Flco::Private => write!(f, "Private"),
        }
    }
}
