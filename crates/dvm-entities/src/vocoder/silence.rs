use dvm_core::PCM_BLOCK_SAMPLES;
use dvm_pdus::dmr::burst::SILENCE_AMBE;

use super::{DecodedAudio, Vocoder, VocoderError, VocoderMode, check_block, check_codeword};

/// Full rate IMBE silence frame
pub const SILENCE_IMBE: [u8; 11] = [0x04, 0x0C, 0xFD, 0x7B, 0xFB, 0x7D, 0xF2, 0x7B, 0x3D, 0x9E, 0x45];

/// Built-in engine without a real codec: every block encodes to the protocol's
/// silence codeword and every codeword decodes to silent PCM.
pub struct SilenceVocoder {
    mode: VocoderMode,
}

impl SilenceVocoder {
    pub fn new(mode: VocoderMode) -> Self {
        Self { mode }
    }
}

impl Vocoder for SilenceVocoder {
    fn mode(&self) -> VocoderMode {
        self.mode
    }

    fn encode(&mut self, pcm: &[i16]) -> Result<Vec<u8>, VocoderError> {
        check_block(pcm)?;
        Ok(match self.mode {
            VocoderMode::Ambe => SILENCE_AMBE.to_vec(),
            VocoderMode::Imbe => SILENCE_IMBE.to_vec(),
        })
    }

    fn decode(&mut self, codeword: &[u8]) -> Result<DecodedAudio, VocoderError> {
        check_codeword(self.mode, codeword)?;
        Ok(DecodedAudio {
            samples: vec![0; PCM_BLOCK_SAMPLES],
            errors: 0,
        })
    }
}
