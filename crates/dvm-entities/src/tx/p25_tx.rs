//! P25 transmit counters and LDU staging for one call.

use dvm_core::FrameParseErr;
use dvm_pdus::p25::dfsi::LduContext;
use dvm_pdus::p25::enums::duid::Duid;
use dvm_pdus::p25::ldu::{LduBuffer, assemble_ldu, assemble_tdu};
use dvm_pdus::p25::{IMBE_PER_LDU, P25_N_PER_CYCLE};

use super::{TxCall, TxPacket};
use crate::audio::adapter::ldu_slot;
use crate::network::NetFunc;

#[derive(Debug, Default)]
pub struct P25TxState {
    /// Codeword index over LDU1 and LDU2, 0..17
    p25_n: u8,
    /// LDUs sent in this call
    seq_no: u32,
    ldu1: LduBuffer,
    ldu2: LduBuffer,
}

impl P25TxState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn p25_n(&self) -> u8 {
        self.p25_n
    }

    pub fn seq_no(&self) -> u32 {
        self.seq_no
    }

    pub fn reset(&mut self) {
        self.p25_n = 0;
        self.seq_no = 0;
    }

    /// Places one IMBE codeword in its LDU slot; the ninth codeword of an LDU yields the message
    pub fn push_codeword(&mut self, codeword: &[u8], call: &TxCall) -> Result<Option<TxPacket>, FrameParseErr> {
        let (duid, slot) = ldu_slot(self.p25_n);
        let ldu = match duid {
            Duid::Ldu1 => &mut self.ldu1,
            _ => &mut self.ldu2,
        };
        if slot == 0 {
            ldu.clear();
        }
        ldu.set_imbe(slot, codeword);

        let mut packet = None;
        if slot == IMBE_PER_LDU - 1 {
            let ctx = LduContext::group(call.src_id, call.dst_id);
            let message = assemble_ldu(duid, ldu, &ctx)?;
            tracing::trace!("P25 TX {} seq {} stream {:08X}", duid, self.seq_no, call.stream_id);
            packet = Some(TxPacket {
                func: NetFunc::P25,
                payload: message.to_vec(),
                reset_pkt_seq: self.seq_no == 0,
                stream_id: call.stream_id,
            });
            self.seq_no += 1;
        }

        self.p25_n += 1;
        if self.p25_n >= P25_N_PER_CYCLE {
            self.p25_n = 0;
        }
        Ok(packet)
    }

    /// TDU for the call. With `grant_demand` it requests a channel grant ahead
    /// of voice; without it ends the call and resets the counters.
    pub fn tdu(&mut self, call: &TxCall, grant_demand: bool) -> TxPacket {
        if !grant_demand {
            self.reset();
        }
        TxPacket {
            func: NetFunc::P25,
            payload: assemble_tdu(call.src_id, call.dst_id, grant_demand).to_vec(),
            reset_pkt_seq: true,
            stream_id: call.stream_id,
        }
    }
}
