/// P25 data unit ID
/// Bits: 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Duid {
    /// Header data unit
    Hdu = 0x00,
    /// Terminator without link control
    Tdu = 0x03,
    /// Logical link data unit 1
    Ldu1 = 0x05,
    /// Trunking signalling data unit
    Tsdu = 0x07,
    /// Logical link data unit 2
    Ldu2 = 0x0A,
    /// Packet data unit
    Pdu = 0x0C,
    /// Terminator with link control
    Tdulc = 0x0F,
}

impl std::convert::TryFrom<u64> for Duid {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0x00 => Ok(Duid::Hdu),
            0x03 => Ok(Duid::Tdu),
            0x05 => Ok(Duid::Ldu1),
            0x07 => Ok(Duid::Tsdu),
            0x0A => Ok(Duid::Ldu2),
            0x0C => Ok(Duid::Pdu),
            0x0F => Ok(Duid::Tdulc),
            _ => Err(()),
        }
    }
}

impl Duid {
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    pub fn is_terminator(self) -> bool {
        matches!(self, Duid::Tdu | Duid::Tdulc)
    }

    pub fn is_voice(self) -> bool {
        matches!(self, Duid::Ldu1 | Duid::Ldu2)
    }
}

impl From<Duid> for u64 {
    fn from(e: Duid) -> Self {
        e.into_raw()
    }
}

impl core::fmt::Display for Duid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Duid::Hdu => write!(f, "HDU"),
            Duid::Tdu => write!(f, "TDU"),
            Duid::Ldu1 => write!(f, "LDU1"),
            Duid::Tsdu => write!(f, "TSDU"),
            Duid::Ldu2 => write!(f, "LDU2"),
            Duid::Pdu => write!(f, "PDU"),
            Duid::Tdulc => write!(f, "TDULC"),
        }
    }
}
