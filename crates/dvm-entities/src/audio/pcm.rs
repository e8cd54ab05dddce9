//! 16-bit mono PCM helpers.

/// Little endian 16-bit samples; a trailing odd byte is ignored
pub fn bytes_to_samples(data: &[u8]) -> Vec<i16> {
    data.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]])).collect()
}

pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Scales samples in place, saturating at full scale
pub fn apply_gain(samples: &mut [i16], gain: f32) {
    if gain == 1.0 {
        return;
    }
    for s in samples.iter_mut() {
        let scaled = (*s as f32 * gain).round();
        *s = scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16;
    }
}

/// Peak absolute level of a block, 0..=1
pub fn peak_level(samples: &[i16]) -> f32 {
    samples
        .iter()
        .map(|&s| (s as i32).unsigned_abs())
        .max()
        .map_or(0.0, |peak| peak as f32 / 32768.0)
}
