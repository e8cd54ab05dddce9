#![allow(dead_code)]

mod bridge_test;
mod recorders;

pub use bridge_test::{BridgeTest, LOUD, QUIET, default_test_config};
pub use recorders::{CallEvent, PlayedBlock, RecordingObserver, RecordingPeer, RecordingSink, ScriptedVocoder, SentPacket};
