//! DMR transmit counters and burst sequencing for one call.

use dvm_core::FrameParseErr;
use dvm_pdus::dmr::codec::{self, EncodedBurst};
use dvm_pdus::dmr::dmrd::DmrdFrame;
use dvm_pdus::dmr::fields::embedded_data::EmbeddedLc;
use dvm_pdus::dmr::fields::lc::DmrLc;
use dvm_pdus::dmr::VOICE_FRAMES_PER_SUPERFRAME;

use super::{TxCall, TxPacket};
use crate::audio::AmbeStaging;
use crate::network::NetFunc;

#[derive(Debug, Default)]
pub struct DmrTxState {
    /// Frames sent in this call; the DMRD byte is the low 8 bits
    seq_no: u32,
    /// Voice burst index within the superframe, 0..5
    n: u8,
    staging: AmbeStaging,
    embedded: Option<EmbeddedLc>,
}

impl DmrTxState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seq_no(&self) -> u32 {
        self.seq_no
    }

    pub fn n(&self) -> u8 {
        self.n
    }

    pub fn reset(&mut self) {
        self.seq_no = 0;
        self.n = 0;
        self.staging.reset();
        self.embedded = None;
    }

    /// Stages one AMBE codeword. The third codeword of a burst yields the
    /// voice frame, preceded by the voice LC header on the first burst of a call.
    pub fn push_codeword(&mut self, codeword: &[u8], call: &TxCall) -> Result<Vec<TxPacket>, FrameParseErr> {
        let Some(ambe) = self.staging.push(codeword) else {
            return Ok(Vec::new());
        };

        let lc = DmrLc::group(call.src_id, call.dst_id);
        let mut packets = Vec::with_capacity(2);
        if self.seq_no == 0 {
            let header = codec::encode_voice_header(&lc)?;
            packets.push(self.packet(header, call));
        }

        // The embedded LC follows source overrides at superframe boundaries
        if self.n == 0 {
            self.embedded = Some(EmbeddedLc::new(&lc));
        }
        let embedded = self.embedded.get_or_insert_with(|| EmbeddedLc::new(&lc));
        let burst = codec::encode_voice_frame(&ambe, self.n, embedded);
        packets.push(self.packet(burst, call));
        self.n = (self.n + 1) % VOICE_FRAMES_PER_SUPERFRAME;
        Ok(packets)
    }

    /// Superframe padding plus terminator with LC. Nothing is sent when the
    /// call never produced a burst. Counters are reset either way.
    pub fn terminator(&mut self, call: &TxCall) -> Result<Vec<TxPacket>, FrameParseErr> {
        if self.seq_no == 0 {
            self.reset();
            return Ok(Vec::new());
        }
        let lc = DmrLc::group(call.src_id, call.dst_id);
        let bursts = codec::encode_terminator(&lc, self.n);
        let packets = bursts.map(|bursts| bursts.into_iter().map(|b| self.packet(b, call)).collect());
        self.reset();
        packets
    }

    fn packet(&mut self, burst: EncodedBurst, call: &TxCall) -> TxPacket {
        let frame = DmrdFrame {
            seq_no: self.seq_no as u8,
            src_id: call.src_id,
            dst_id: call.dst_id,
            peer_id: call.peer_id,
            slot: call.slot,
            private_call: false,
            frame_type: burst.frame_type,
            dt_or_n: burst.dt_or_n,
            stream_id: call.stream_id,
            burst: burst.burst,
            ber: 0,
            rssi: 0,
        };
        tracing::trace!("DMR TX {:?}", frame);
        let reset_pkt_seq = self.seq_no == 0;
        self.seq_no = self.seq_no.wrapping_add(1);
        TxPacket {
            func: NetFunc::DMR,
            payload: frame.to_bytes().to_vec(),
            reset_pkt_seq,
            stream_id: call.stream_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvm_pdus::dmr::enums::data_type::DataType;
    use dvm_pdus::dmr::enums::frame_type::FrameType;

    fn call() -> TxCall {
        TxCall {
            stream_id: 0x1234,
            src_id: 1001,
            dst_id: 9,
            slot: 2,
            peer_id: 77,
        }
    }

    fn frame(p: &TxPacket) -> DmrdFrame {
        DmrdFrame::from_bytes(&p.payload).unwrap()
    }

    #[test]
    fn test_first_burst_has_header() {
        let mut s = DmrTxState::new();
        assert!(s.push_codeword(&[0x11; 9], &call()).unwrap().is_empty());
        assert!(s.push_codeword(&[0x22; 9], &call()).unwrap().is_empty());
        let packets = s.push_codeword(&[0x33; 9], &call()).unwrap();
        assert_eq!(packets.len(), 2);

        let header = frame(&packets[0]);
        assert_eq!(header.frame_type, FrameType::DataSync);
        assert_eq!(header.data_type(), Some(DataType::VoiceLcHeader));
        assert_eq!(header.seq_no, 0);
        assert_eq!(header.slot, 2);
        assert!(packets[0].reset_pkt_seq);

        let voice = frame(&packets[1]);
        assert_eq!(voice.frame_type, FrameType::VoiceSync);
        assert_eq!(voice.dt_or_n, 0);
        assert_eq!(voice.seq_no, 1);
        assert!(!packets[1].reset_pkt_seq);
        assert_eq!(s.n(), 1);
    }

    #[test]
    fn test_terminator_pads_superframe() {
        let mut s = DmrTxState::new();
        // Two bursts: n=0 and n=1 sent, next would be n=2
        for _ in 0..6 {
            s.push_codeword(&[0x55; 9], &call()).unwrap();
        }
        assert_eq!(s.n(), 2);
        let packets = s.terminator(&call()).unwrap();
        assert_eq!(packets.len(), 5);
        let ns: Vec<u8> = packets[..4].iter().map(|p| frame(p).dt_or_n).collect();
        assert_eq!(ns, vec![2, 3, 4, 5]);
        assert_eq!(frame(&packets[4]).data_type(), Some(DataType::TerminatorWithLc));
        assert_eq!(frame(&packets[4]).seq_no, 7);
        assert_eq!(s.seq_no(), 0);
        assert_eq!(s.n(), 0);
    }

    #[test]
    fn test_terminator_without_voice_is_empty() {
        let mut s = DmrTxState::new();
        s.push_codeword(&[0x55; 9], &call()).unwrap();
        assert!(s.terminator(&call()).unwrap().is_empty());
    }
}
