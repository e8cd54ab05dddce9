//! Audio level keying: tracks when voice was last heard and how long the
//! input has been quiet.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct VoxDetector {
    threshold: f32,
    drop_time: Duration,
    last_voice: Option<Instant>,
    silence_since: Option<Instant>,
}

impl VoxDetector {
    pub fn new(threshold: f32, drop_time: Duration) -> Self {
        VoxDetector {
            threshold,
            drop_time,
            last_voice: None,
            silence_since: None,
        }
    }

    pub fn drop_time(&self) -> Duration {
        self.drop_time
    }

    /// Meters one block. Returns true when the level exceeds the threshold.
    pub fn observe(&mut self, level: f32, now: Instant) -> bool {
        if level > self.threshold {
            self.last_voice = Some(now);
            self.silence_since = None;
            true
        } else {
            self.silence_since.get_or_insert(now);
            false
        }
    }

    /// Quiet for longer than the drop time
    pub fn drop_elapsed(&self, now: Instant) -> bool {
        self.silence_since
            .is_some_and(|since| now.saturating_duration_since(since) > self.drop_time)
    }

    /// No voice for twice the drop time; the key is considered stuck
    pub fn is_stale(&self, now: Instant) -> bool {
        match self.last_voice {
            Some(last) => now.saturating_duration_since(last) > self.drop_time * 2,
            None => true,
        }
    }

    pub fn reset(&mut self) {
        self.last_voice = None;
        self.silence_since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_and_stale() {
        let t0 = Instant::now();
        let mut vox = VoxDetector::new(0.03, Duration::from_millis(100));
        assert!(vox.observe(0.5, t0));
        assert!(!vox.drop_elapsed(t0));

        assert!(!vox.observe(0.0, t0 + Duration::from_millis(20)));
        assert!(!vox.drop_elapsed(t0 + Duration::from_millis(120)));
        assert!(vox.drop_elapsed(t0 + Duration::from_millis(121)));

        assert!(!vox.is_stale(t0 + Duration::from_millis(200)));
        assert!(vox.is_stale(t0 + Duration::from_millis(201)));

        // Voice restarts the silence stopwatch
        vox.observe(0.5, t0 + Duration::from_millis(150));
        assert!(!vox.drop_elapsed(t0 + Duration::from_millis(200)));
    }
}
