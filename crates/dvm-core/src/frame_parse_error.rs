/// Error produced by every wire-level decoder in the bridge
#[derive(Debug, PartialEq, Eq)]
pub enum FrameParseErr {
    /// Frame shorter than the layout requires
    BufferEnded { field: Option<&'static str> },
    /// Magic tag such as "DMRD" or "P25D" did not match
    InvalidTag { expected: &'static str },
    InvalidValue { field: &'static str, value: u64 },
    InconsistentLength { expected: usize, found: usize },
    /// FEC decode could not recover the field
    Uncorrectable { field: &'static str },
    /// A checksum did not match after decoding
    ChecksumMismatch { field: &'static str },
}

impl core::fmt::Display for FrameParseErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameParseErr::BufferEnded { field: Some(name) } => write!(f, "buffer ended reading {}", name),
            FrameParseErr::BufferEnded { field: None } => write!(f, "buffer ended"),
            FrameParseErr::InvalidTag { expected } => write!(f, "missing {} tag", expected),
            FrameParseErr::InvalidValue { field, value } => write!(f, "invalid value {} for {}", value, field),
            FrameParseErr::InconsistentLength { expected, found } => {
                write!(f, "inconsistent length: expected {}, found {}", expected, found)
            }
            FrameParseErr::Uncorrectable { field } => write!(f, "uncorrectable errors in {}", field),
            FrameParseErr::ChecksumMismatch { field } => write!(f, "checksum mismatch in {}", field),
        }
    }
}

impl std::error::Error for FrameParseErr {}

/// Fails with FrameParseErr::BufferEnded unless `buf` holds at least `len` bytes
#[macro_export]
macro_rules! expect_len {
    ($buf:expr, $len:expr, $field:expr) => {{
        if $buf.len() < $len {
            Err($crate::FrameParseErr::BufferEnded { field: Some($field) })
        } else {
            Ok(())
        }
    }};
}

#[macro_export]
macro_rules! let_field {
    ($buf:expr, $ident:ident, $bits:expr) => {
        let $ident = $buf.read_field($bits, stringify!($ident))?;
    };
}
