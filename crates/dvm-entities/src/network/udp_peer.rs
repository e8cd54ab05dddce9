//! Bundled `FnePeer`: plain datagrams to the master, plus the receive worker
//! that posts master traffic to the bridge.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::Sender;

use dvm_core::{StreamId, hex_dump};

use super::fne_peer::{FneMessage, FnePeer, NetFunc, PktSeqCounter};
use super::transports::{NetworkError, NetworkTransport};
use crate::bridge::worker::BridgeCommand;

pub struct UdpFnePeer<T: NetworkTransport> {
    transport: T,
    peer_id: u32,
    pkt_seq: PktSeqCounter,
    raw_packet_trace: bool,
}

impl<T: NetworkTransport> UdpFnePeer<T> {
    pub fn new(transport: T, peer_id: u32, raw_packet_trace: bool) -> Self {
        Self {
            transport,
            peer_id,
            pkt_seq: PktSeqCounter::default(),
            raw_packet_trace,
        }
    }
}

impl<T: NetworkTransport> FnePeer for UdpFnePeer<T> {
    fn peer_id(&self) -> u32 {
        self.peer_id
    }

    fn pkt_seq(&mut self, reset: bool) -> u16 {
        self.pkt_seq.next(reset)
    }

    fn send_master(&mut self, func: NetFunc, payload: &[u8], pkt_seq: u16, stream_id: StreamId) -> Result<(), NetworkError> {
        let msg = FneMessage {
            func,
            pkt_seq,
            stream_id,
            peer_id: self.peer_id,
            payload: payload.to_vec(),
        };
        let bytes = msg.to_bytes();
        if self.raw_packet_trace {
            tracing::trace!(stream = stream_id, "TX {} seq {}: {}", func, pkt_seq, hex_dump(&bytes));
        }
        self.transport.send(&bytes)
    }
}

/// Spawns the `fne-rx` thread. It runs until `running` clears or the bridge
/// command channel closes.
pub fn spawn_fne_rx<T: NetworkTransport + 'static>(
    mut transport: T,
    commands: Sender<BridgeCommand>,
    running: Arc<AtomicBool>,
    raw_packet_trace: bool,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new().name("fne-rx".to_string()).spawn(move || {
        tracing::info!("fne-rx: started");
        while running.load(Ordering::SeqCst) {
            let data = match transport.receive() {
                Ok(Some(data)) => data,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!("fne-rx: {}", e);
                    thread::sleep(std::time::Duration::from_millis(500));
                    continue;
                }
            };
            if raw_packet_trace {
                tracing::trace!("RX {}", hex_dump(&data));
            }
            match FneMessage::from_bytes(&data) {
                Ok(msg) => {
                    if commands.send(BridgeCommand::Network(msg)).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("fne-rx: dropping datagram: {}", e),
            }
        }
        tracing::info!("fne-rx: stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedTransport {
        sent: Vec<Vec<u8>>,
        inbound: VecDeque<Vec<u8>>,
    }

    impl NetworkTransport for ScriptedTransport {
        fn connect(&mut self) -> Result<(), NetworkError> {
            Ok(())
        }
        fn send(&mut self, payload: &[u8]) -> Result<(), NetworkError> {
            self.sent.push(payload.to_vec());
            Ok(())
        }
        fn receive(&mut self) -> Result<Option<Vec<u8>>, NetworkError> {
            Ok(self.inbound.pop_front())
        }
    }

    #[test]
    fn test_send_master_wraps_payload() {
        let mut peer = UdpFnePeer::new(ScriptedTransport::default(), 42, false);
        let seq = peer.pkt_seq(true);
        peer.send_master(NetFunc::DMR, &[1, 2, 3], seq, 7).unwrap();
        let sent = &peer.transport.sent[0];
        let msg = FneMessage::from_bytes(sent).unwrap();
        assert_eq!(msg.func, NetFunc::DMR);
        assert_eq!(msg.peer_id, 42);
        assert_eq!(msg.stream_id, 7);
        assert_eq!(msg.payload, vec![1, 2, 3]);
    }

    #[test]
    fn test_rx_worker_posts_messages() {
        let msg = FneMessage {
            func: NetFunc::P25,
            pkt_seq: 3,
            stream_id: 99,
            peer_id: 1,
            payload: vec![9; 4],
        };
        let mut transport = ScriptedTransport::default();
        transport.inbound.push_back(vec![0; 4]);
        transport.inbound.push_back(msg.to_bytes());

        let (tx, rx) = crossbeam_channel::unbounded();
        let running = Arc::new(AtomicBool::new(true));
        let handle = spawn_fne_rx(transport, tx, running.clone(), true).unwrap();

        match rx.recv_timeout(std::time::Duration::from_secs(2)).unwrap() {
            BridgeCommand::Network(got) => assert_eq!(got, msg),
            other => panic!("unexpected command {:?}", other),
        }
        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
    }
}
