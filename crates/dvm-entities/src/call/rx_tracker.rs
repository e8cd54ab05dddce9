//! Per-channel RX call lifecycle, driven by received frames.

use std::time::{Duration, Instant};

use dvm_core::{CallChannel, RadioId, StreamId};

use super::slot_status::{RxType, SlotStatus};

/// Outcome of feeding one frame to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxTransition {
    /// First frame of a stream not seen before
    CallStart,
    /// Terminator of a call in progress
    CallEnd { duration: Duration },
    Continue,
}

#[derive(Debug, Default)]
pub struct RxCallTracker {
    status: [SlotStatus; 3],
}

impl RxCallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, channel: CallChannel) -> &SlotStatus {
        &self.status[channel.status_index()]
    }

    pub fn status_mut(&mut self, channel: CallChannel) -> &mut SlotStatus {
        &mut self.status[channel.status_index()]
    }

    /// True while any channel is between call start and terminator
    pub fn any_active(&self) -> bool {
        self.status.iter().any(|s| s.rx_in_progress())
    }

    /// Closes calls that saw no frame for `timeout`. Returns the state each had when it expired.
    pub fn expire_stale(&mut self, now: Instant, timeout: Duration) -> Vec<(CallChannel, SlotStatus)> {
        const CHANNELS: [CallChannel; 3] = [CallChannel::DmrSlot(1), CallChannel::DmrSlot(2), CallChannel::P25];
        let mut expired = Vec::new();
        for channel in CHANNELS {
            let status = self.status_mut(channel);
            let stale = status
                .rx_time
                .is_some_and(|last| now.saturating_duration_since(last) > timeout);
            if status.rx_in_progress() && stale {
                expired.push((channel, status.clone()));
                status.rx_type = RxType::Terminator;
            }
        }
        expired
    }

    /// Records a validated frame. A new stream ID opens a call unless the frame
    /// is a terminator; a terminator closes the call once, repeats are ignored.
    pub fn on_frame(
        &mut self,
        channel: CallChannel,
        stream_id: StreamId,
        src_id: RadioId,
        dst_id: RadioId,
        rx_type: RxType,
        now: Instant,
    ) -> RxTransition {
        let status = self.status_mut(channel);
        let mut transition = RxTransition::Continue;

        if rx_type == RxType::Terminator {
            if status.rx_type != RxType::Terminator {
                let duration = status.rx_start.map_or(Duration::ZERO, |start| now.saturating_duration_since(start));
                transition = RxTransition::CallEnd { duration };
            }
        } else if stream_id != status.rx_stream_id {
            if status.rx_in_progress() {
                tracing::warn!(
                    "{} stream {:08X} replaced by {:08X} without terminator",
                    channel,
                    status.rx_stream_id,
                    stream_id
                );
            }
            status.rx_stream_id = stream_id;
            status.rx_start = Some(now);
            status.lc = None;
            status.pi_lc = None;
            transition = RxTransition::CallStart;
        } else if !status.rx_in_progress() {
            // Late frame of a call that already ended
            return RxTransition::Continue;
        }

        status.rx_rfs = src_id;
        status.rx_tg_id = dst_id;
        status.rx_type = rx_type;
        status.rx_time = Some(now);
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS1: CallChannel = CallChannel::DmrSlot(1);

    #[test]
    fn test_stream_change_starts_once() {
        let mut t = RxCallTracker::new();
        let now = Instant::now();
        assert_eq!(t.on_frame(TS1, 5, 100, 1, RxType::VoiceHeader, now), RxTransition::CallStart);
        assert_eq!(t.on_frame(TS1, 5, 100, 1, RxType::Voice, now), RxTransition::Continue);
        assert!(t.any_active());
        assert_eq!(t.on_frame(TS1, 7, 100, 1, RxType::Voice, now), RxTransition::CallStart);
        let end = t.on_frame(TS1, 7, 100, 1, RxType::Terminator, now + Duration::from_millis(500));
        assert_eq!(
            end,
            RxTransition::CallEnd {
                duration: Duration::from_millis(500)
            }
        );
        assert!(!t.any_active());
    }

    #[test]
    fn test_duplicate_terminator_ignored() {
        let mut t = RxCallTracker::new();
        let now = Instant::now();
        t.on_frame(CallChannel::P25, 9, 1, 2, RxType::Voice, now);
        assert!(matches!(
            t.on_frame(CallChannel::P25, 9, 1, 2, RxType::Terminator, now),
            RxTransition::CallEnd { .. }
        ));
        assert_eq!(
            t.on_frame(CallChannel::P25, 9, 1, 2, RxType::Terminator, now),
            RxTransition::Continue
        );
        // Late voice of the finished stream does not reopen it
        assert_eq!(t.on_frame(CallChannel::P25, 9, 1, 2, RxType::Voice, now), RxTransition::Continue);
        assert!(!t.any_active());
    }

    #[test]
    fn test_expire_stale() {
        let mut t = RxCallTracker::new();
        let t0 = Instant::now();
        t.on_frame(TS1, 3, 10, 1, RxType::Voice, t0);
        assert!(t.expire_stale(t0 + Duration::from_secs(1), Duration::from_secs(2)).is_empty());
        let expired = t.expire_stale(t0 + Duration::from_secs(3), Duration::from_secs(2));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].0, TS1);
        assert_eq!(expired[0].1.rx_stream_id, 3);
        assert!(!t.any_active());
        assert!(t.expire_stale(t0 + Duration::from_secs(9), Duration::from_secs(2)).is_empty());
    }

    #[test]
    fn test_slots_are_independent() {
        let mut t = RxCallTracker::new();
        let t0 = Instant::now();
        t.on_frame(TS1, 1, 10, 1, RxType::Voice, t0);
        t.on_frame(CallChannel::DmrSlot(2), 2, 20, 1, RxType::Voice, t0 + Duration::from_secs(1));
        let end = t.on_frame(CallChannel::DmrSlot(2), 2, 20, 1, RxType::Terminator, t0 + Duration::from_secs(3));
        assert_eq!(
            end,
            RxTransition::CallEnd {
                duration: Duration::from_secs(2)
            }
        );
        assert!(t.status(TS1).rx_in_progress());
        assert_eq!(t.status(TS1).rx_rfs, 10);
    }
}
