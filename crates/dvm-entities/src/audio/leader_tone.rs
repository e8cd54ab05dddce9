use dvm_core::SAMPLE_RATE;

/// Leader tone amplitude relative to full scale
const TONE_GAIN: f32 = 0.2;

/// Sine preamble of `length_ms` at `tone_hz`
pub fn generate(tone_hz: u32, length_ms: u32) -> Vec<i16> {
    let count = (SAMPLE_RATE as u64 * length_ms as u64 / 1000) as usize;
    let step = 2.0 * std::f32::consts::PI * tone_hz as f32 / SAMPLE_RATE as f32;
    (0..count)
        .map(|i| ((i as f32 * step).sin() * TONE_GAIN * i16::MAX as f32) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_length_and_level() {
        let tone = generate(2175, 200);
        assert_eq!(tone.len(), 1600);
        let peak = tone.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak <= (0.2 * 32767.0) as u16 + 1);
        assert!(peak > 6000);
    }
}
