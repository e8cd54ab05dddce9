use dvm_core::RadioId;

/// Destination for decoded PCM
pub trait PcmSink: Send {
    fn play(&mut self, samples: &[i16], src_id: RadioId, dst_id: RadioId);
}

/// Discards audio; used when no UDP audio endpoint is configured
#[derive(Debug, Default)]
pub struct NullPcmSink;

impl PcmSink for NullPcmSink {
    fn play(&mut self, samples: &[i16], src_id: RadioId, dst_id: RadioId) {
        tracing::trace!("discarding {} samples SRC_ID {} TGID {}", samples.len(), src_id, dst_id);
    }
}
