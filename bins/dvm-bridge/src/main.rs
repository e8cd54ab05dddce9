use clap::Parser;

use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dvm_config::{SharedConfig, toml_config};
use dvm_core::{STACK_VERSION, debug};
use dvm_entities::audio::udp_audio::{UdpAudioSink, spawn_udp_audio_rx};
use dvm_entities::audio::{NullPcmSink, PcmSink};
use dvm_entities::network::NetworkTransport;
use dvm_entities::network::transports::udp::UdpTransport;
use dvm_entities::network::udp_peer::{UdpFnePeer, spawn_fne_rx};
use dvm_entities::{BridgeEntity, BridgeHandle};

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

fn exit_with(msg: &str, e: impl std::fmt::Display) -> ! {
    tracing::error!("{}: {}", msg, e);
    eprintln!("{}: {}", msg, e);
    std::process::exit(1);
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "DVM FNE audio bridge",
    long_about = "Bridges PCM audio to DMR or P25 traffic on an FNE master, using the provided TOML configuration file"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with FNE, call and audio parameters")]
    config: String,
}

fn main() {
    eprintln!("DVM FNE audio bridge {}\n", STACK_VERSION);

    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());
    let c = cfg.config();

    // Master link: one socket, cloned for the receive worker
    let mut transport = UdpTransport::new(&c.fne.address, c.fne.port, &c.fne.bind_address);
    if let Err(e) = transport.connect() {
        exit_with("Failed to reach FNE master", e);
    }
    let rx_transport = match transport.try_clone() {
        Ok(t) => t,
        Err(e) => exit_with("Failed to clone FNE socket", e),
    };
    let peer = UdpFnePeer::new(transport, c.system.peer_id, c.system.raw_packet_trace);

    let mut audio_rx_socket = None;
    let sink: Box<dyn PcmSink> = match &c.udp_audio {
        Some(u) => {
            let rx = UdpSocket::bind((u.receive_address.as_str(), u.receive_port))
                .unwrap_or_else(|e| exit_with("Failed to bind UDP audio receive socket", e));
            let tx = UdpSocket::bind("0.0.0.0:0").unwrap_or_else(|e| exit_with("Failed to bind UDP audio send socket", e));
            audio_rx_socket = Some(rx);
            eprintln!(" -> UDP audio to {}:{}, from port {}", u.send_address, u.send_port, u.receive_port);
            Box::new(UdpAudioSink::new(tx, &u.send_address, u.send_port, u.metadata))
        }
        None => Box::new(NullPcmSink),
    };

    let entity = BridgeEntity::new(cfg.clone(), Box::new(peer), sink);
    let handle = BridgeHandle::spawn(entity).unwrap_or_else(|e| exit_with("Failed to start bridge worker", e));

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        exit_with("Failed to set Ctrl+C handler", e);
    }

    let mut workers = Vec::new();
    match spawn_fne_rx(rx_transport, handle.sender(), running.clone(), c.system.raw_packet_trace) {
        Ok(w) => workers.push(w),
        Err(e) => exit_with("Failed to start FNE receive worker", e),
    }
    if let (Some(socket), Some(u)) = (audio_rx_socket, &c.udp_audio) {
        match spawn_udp_audio_rx(socket, handle.sender(), running.clone(), u.metadata) {
            Ok(w) => workers.push(w),
            Err(e) => exit_with("Failed to start UDP audio receive worker", e),
        }
    }

    tracing::info!("bridge {} running as peer {}", c.system.name, c.system.peer_id);
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    // Bridge first so a live call gets its terminator, then the receive workers
    handle.shutdown();
    for w in workers {
        let _ = w.join();
    }
}
