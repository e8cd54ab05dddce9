pub mod adapter;
pub mod leader_tone;
pub mod pcm;
pub mod sink;
pub mod udp_audio;

pub use adapter::{AmbeStaging, PcmBlocker};
pub use sink::{NullPcmSink, PcmSink};
