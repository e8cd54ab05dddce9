//! PCM over plain UDP datagrams, 16-bit little endian at 8 kHz. With metadata
//! enabled, inbound datagrams lead with a big endian source ID and outbound
//! blocks trail source and destination IDs.

use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use dvm_core::RadioId;

use super::pcm::{bytes_to_samples, samples_to_bytes};
use super::sink::PcmSink;
use crate::bridge::worker::BridgeCommand;

const METADATA_SRC_LEN: usize = 4;

pub struct UdpAudioSink {
    socket: UdpSocket,
    target: String,
    metadata: bool,
}

impl UdpAudioSink {
    pub fn new(socket: UdpSocket, send_address: &str, send_port: u16, metadata: bool) -> Self {
        Self {
            socket,
            target: format!("{}:{}", send_address, send_port),
            metadata,
        }
    }
}

/// Outbound datagram for one block of decoded audio
pub fn encode_outbound(samples: &[i16], src_id: RadioId, dst_id: RadioId, metadata: bool) -> Vec<u8> {
    let mut out = samples_to_bytes(samples);
    if metadata {
        out.extend_from_slice(&src_id.to_be_bytes());
        out.extend_from_slice(&dst_id.to_be_bytes());
    }
    out
}

/// Splits an inbound datagram into PCM and the source ID, if metadata is
/// enabled and the ID is non-zero
pub fn decode_inbound(data: &[u8], metadata: bool) -> (Vec<i16>, Option<RadioId>) {
    if metadata && data.len() >= METADATA_SRC_LEN {
        let src = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let src = (src != 0).then_some(src);
        (bytes_to_samples(&data[METADATA_SRC_LEN..]), src)
    } else {
        (bytes_to_samples(data), None)
    }
}

impl PcmSink for UdpAudioSink {
    fn play(&mut self, samples: &[i16], src_id: RadioId, dst_id: RadioId) {
        let datagram = encode_outbound(samples, src_id, dst_id, self.metadata);
        if let Err(e) = self.socket.send_to(&datagram, &self.target) {
            tracing::warn!("UdpAudioSink: send to {} failed: {}", self.target, e);
        }
    }
}

/// Spawns the `udp-audio-rx` thread posting received PCM to the bridge
pub fn spawn_udp_audio_rx(
    socket: UdpSocket,
    commands: Sender<BridgeCommand>,
    running: Arc<AtomicBool>,
    metadata: bool,
) -> std::io::Result<thread::JoinHandle<()>> {
    socket.set_read_timeout(Some(Duration::from_millis(100)))?;
    thread::Builder::new().name("udp-audio-rx".to_string()).spawn(move || {
        tracing::info!("udp-audio-rx: listening on {:?}", socket.local_addr());
        let mut buf = [0u8; 4096];
        while running.load(Ordering::SeqCst) {
            let len = match socket.recv(&mut buf) {
                Ok(len) => len,
                Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {
                    continue;
                }
                Err(e) => {
                    tracing::error!("udp-audio-rx: {}", e);
                    thread::sleep(Duration::from_millis(500));
                    continue;
                }
            };
            let (samples, src_id) = decode_inbound(&buf[..len], metadata);
            if samples.is_empty() {
                continue;
            }
            if commands.send(BridgeCommand::Pcm { samples, src_id }).is_err() {
                break;
            }
        }
        tracing::info!("udp-audio-rx: stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_metadata_trails_pcm() {
        let out = encode_outbound(&[1, -1], 0x010203, 9, true);
        assert_eq!(out, vec![0x01, 0x00, 0xFF, 0xFF, 0x00, 0x01, 0x02, 0x03, 0, 0, 0, 9]);
        assert_eq!(encode_outbound(&[1], 5, 9, false), vec![0x01, 0x00]);
    }

    #[test]
    fn test_inbound_metadata_leads_pcm() {
        let (pcm, src) = decode_inbound(&[0, 0, 0x13, 0x88, 0x10, 0x00], true);
        assert_eq!(src, Some(5000));
        assert_eq!(pcm, vec![0x10]);

        let (pcm, src) = decode_inbound(&[0, 0, 0, 0, 0x10, 0x00], true);
        assert_eq!(src, None);
        assert_eq!(pcm, vec![0x10]);

        let (pcm, src) = decode_inbound(&[0x10, 0x00], false);
        assert_eq!((pcm, src), (vec![0x10], None));
    }

    #[test]
    fn test_rx_worker_posts_pcm() {
        let rx_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = rx_socket.local_addr().unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();
        let running = Arc::new(AtomicBool::new(true));
        let handle = spawn_udp_audio_rx(rx_socket, tx, running.clone(), true).unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut sink = UdpAudioSink::new(sender, &addr.ip().to_string(), addr.port(), false);
        // Metadata disabled on the sink side: the first two samples read as source ID 7
        sink.play(&[0, 0x0700, 0x1234], 0, 0);

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            BridgeCommand::Pcm { samples, src_id } => {
                assert_eq!(src_id, Some(7));
                assert_eq!(samples, vec![0x1234]);
            }
            other => panic!("unexpected command {:?}", other),
        }
        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
    }
}
