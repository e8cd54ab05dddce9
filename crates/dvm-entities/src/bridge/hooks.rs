//! Strategy objects injected into the bridge entity.

use std::time::Duration;

use dvm_pdus::dmr::dmrd::DmrdFrame;
use dvm_pdus::p25::ldu::LduBuffer;
use dvm_pdus::p25::p25d::P25Header;

use crate::call::CallInfo;

/// Final say on whether a received frame is bridged. Runs after the
/// built-in source, call type and destination checks.
pub trait FrameValidator: Send {
    fn validate_dmr(&self, _frame: &DmrdFrame) -> bool {
        true
    }

    fn validate_p25(&self, _header: &P25Header, _ldu: Option<&LduBuffer>) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct AcceptAllFrames;

impl FrameValidator for AcceptAllFrames {}

/// Notified when RX and TX calls begin and end
pub trait CallObserver: Send {
    fn call_start(&mut self, info: &CallInfo);

    fn call_end(&mut self, info: &CallInfo, duration: Duration);
}

#[derive(Debug, Default)]
pub struct LoggingCallObserver;

impl CallObserver for LoggingCallObserver {
    fn call_start(&mut self, info: &CallInfo) {
        tracing::info!("{} call start", info);
    }

    fn call_end(&mut self, info: &CallInfo, duration: Duration) {
        tracing::info!("{} call end, {:.2}s", info, duration.as_secs_f32());
    }
}
