//! Protocol state and the actor of the DVM FNE audio bridge
//!
//! - `call`: per-channel RX call lifecycle
//! - `tx`: VOX keying and DMR/P25 transmit sequencing
//! - `audio`: PCM blocking, codeword staging, sinks and UDP audio
//! - `vocoder`: runtime-selected MBE engine strategy
//! - `network`: FNE peer interface and the bundled UDP peer
//! - `bridge`: the entity owning all of the above, and its worker thread

pub mod audio;
pub mod bridge;
pub mod call;
pub mod network;
pub mod tx;
pub mod vocoder;

pub use bridge::{BridgeCommand, BridgeEntity, BridgeHandle};
