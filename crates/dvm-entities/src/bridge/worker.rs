//! Actor thread owning the `BridgeEntity`. Audio, network and side channel
//! input arrive as commands; the stuck call watchdog ticks in the same loop.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, select, tick, unbounded};

use dvm_core::RadioId;

use super::entity::BridgeEntity;
use crate::network::FneMessage;

/// Watchdog polling period
const WATCHDOG_PERIOD: Duration = Duration::from_millis(10);

/// Bounded wait for the worker on shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub enum BridgeCommand {
    /// Captured PCM, with the source ID from UDP audio metadata when present
    Pcm { samples: Vec<i16>, src_id: Option<RadioId> },
    Network(FneMessage),
    /// Source ID decoded from the analog side channel
    AnalogId(RadioId),
    Shutdown,
}

pub struct BridgeHandle {
    command_sender: Sender<BridgeCommand>,
    worker_handle: Option<thread::JoinHandle<()>>,
}

impl BridgeHandle {
    pub fn spawn(entity: BridgeEntity) -> std::io::Result<Self> {
        let (command_sender, command_receiver) = unbounded::<BridgeCommand>();
        let handle = thread::Builder::new()
            .name("bridge-worker".to_string())
            .spawn(move || run(entity, command_receiver))?;
        Ok(Self {
            command_sender,
            worker_handle: Some(handle),
        })
    }

    /// Sender for producer threads
    pub fn sender(&self) -> Sender<BridgeCommand> {
        self.command_sender.clone()
    }

    pub fn send_pcm(&self, samples: Vec<i16>, src_id: Option<RadioId>) {
        let _ = self.command_sender.send(BridgeCommand::Pcm { samples, src_id });
    }

    pub fn report_analog_id(&self, src_id: RadioId) {
        let _ = self.command_sender.send(BridgeCommand::AnalogId(src_id));
    }

    /// Ends a live call and waits for the worker to stop
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(handle) = self.worker_handle.take() else {
            return;
        };
        tracing::info!("BridgeHandle: shutting down");
        let _ = self.command_sender.send(BridgeCommand::Shutdown);

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                let _ = handle.join();
                tracing::info!("BridgeHandle: worker thread joined cleanly");
                break;
            }
            if start.elapsed() >= SHUTDOWN_TIMEOUT {
                tracing::warn!("BridgeHandle: worker thread did not finish in time, abandoning");
                break;
            }
            thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(mut entity: BridgeEntity, commands: Receiver<BridgeCommand>) {
    tracing::info!("bridge-worker: started");
    let watchdog = tick(WATCHDOG_PERIOD);
    loop {
        select! {
            recv(commands) -> cmd => match cmd {
                Ok(BridgeCommand::Pcm { samples, src_id }) => entity.handle_pcm(&samples, src_id, Instant::now()),
                Ok(BridgeCommand::Network(msg)) => entity.handle_network(msg, Instant::now()),
                Ok(BridgeCommand::AnalogId(src_id)) => entity.handle_analog_id(src_id),
                Ok(BridgeCommand::Shutdown) | Err(_) => break,
            },
            recv(watchdog) -> _ => entity.watchdog(Instant::now()),
        }
    }
    entity.shutdown(Instant::now());
    tracing::info!("bridge-worker: stopped");
}
