//! Vocoder strategy: the MBE engine is an opaque codeword service chosen at startup.

pub mod silence;

use dvm_config::VocoderBackend;
use dvm_core::PCM_BLOCK_SAMPLES;
use dvm_pdus::dmr::AMBE_BUF_LEN;
use dvm_pdus::p25::IMBE_BUF_LEN;

pub use silence::SilenceVocoder;

/// Codeword family a vocoder instance works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocoderMode {
    /// DMR half rate, 9-byte codewords
    Ambe,
    /// P25 full rate, 11-byte codewords
    Imbe,
}

impl VocoderMode {
    pub fn codeword_len(self) -> usize {
        match self {
            VocoderMode::Ambe => AMBE_BUF_LEN,
            VocoderMode::Imbe => IMBE_BUF_LEN,
        }
    }
}

impl core::fmt::Display for VocoderMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VocoderMode::Ambe => write!(f, "AMBE"),
            VocoderMode::Imbe => write!(f, "IMBE"),
        }
    }
}

/// Decoded PCM block plus the bit error count reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub errors: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocoderError {
    CodewordLength { expected: usize, found: usize },
    BlockLength { expected: usize, found: usize },
    Engine(String),
}

impl std::fmt::Display for VocoderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VocoderError::CodewordLength { expected, found } => {
                write!(f, "codeword of {} bytes, expected {}", found, expected)
            }
            VocoderError::BlockLength { expected, found } => {
                write!(f, "PCM block of {} samples, expected {}", found, expected)
            }
            VocoderError::Engine(msg) => write!(f, "vocoder engine failed: {}", msg),
        }
    }
}

impl std::error::Error for VocoderError {}

/// Encodes 160-sample PCM blocks to codewords and back
pub trait Vocoder: Send {
    fn mode(&self) -> VocoderMode;

    fn encode(&mut self, pcm: &[i16]) -> Result<Vec<u8>, VocoderError>;

    /// Errors in the codeword are reported in `DecodedAudio::errors`; PCM is still returned
    fn decode(&mut self, codeword: &[u8]) -> Result<DecodedAudio, VocoderError>;
}

/// Length checks shared by engines
pub fn check_block(pcm: &[i16]) -> Result<(), VocoderError> {
    if pcm.len() != PCM_BLOCK_SAMPLES {
        return Err(VocoderError::BlockLength {
            expected: PCM_BLOCK_SAMPLES,
            found: pcm.len(),
        });
    }
    Ok(())
}

pub fn check_codeword(mode: VocoderMode, codeword: &[u8]) -> Result<(), VocoderError> {
    if codeword.len() != mode.codeword_len() {
        return Err(VocoderError::CodewordLength {
            expected: mode.codeword_len(),
            found: codeword.len(),
        });
    }
    Ok(())
}

/// Instantiates the configured engine for one codeword family
pub fn create_vocoder(backend: VocoderBackend, mode: VocoderMode) -> Box<dyn Vocoder> {
    match backend {
        VocoderBackend::Silence => Box::new(SilenceVocoder::new(mode)),
    }
}
