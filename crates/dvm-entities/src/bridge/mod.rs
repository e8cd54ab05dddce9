pub mod entity;
pub mod hooks;
pub mod worker;

pub use entity::BridgeEntity;
pub use hooks::{AcceptAllFrames, CallObserver, FrameValidator, LoggingCallObserver};
pub use worker::{BridgeCommand, BridgeHandle};
