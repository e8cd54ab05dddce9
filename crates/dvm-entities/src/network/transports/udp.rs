use std::net::UdpSocket;
use std::time::Duration;

use super::{NetworkError, NetworkTransport};

/// Read timeout bounding how long `receive` blocks
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest datagram the master sends
const MAX_DATAGRAM: usize = 2048;

/// UDP transport bound locally and connected to the master address
pub struct UdpTransport {
    socket: Option<UdpSocket>,
    server_addr: String,
    bind_addr: String,
}

impl UdpTransport {
    pub fn new(host: &str, port: u16, bind_addr: &str) -> Self {
        Self {
            socket: None,
            server_addr: format!("{}:{}", host, port),
            bind_addr: bind_addr.to_string(),
        }
    }

    fn ensure_connected(&mut self) -> Result<&UdpSocket, NetworkError> {
        if self.socket.is_none() {
            self.connect()?;
        }
        self.socket
            .as_ref()
            .ok_or_else(|| NetworkError::ConnectionFailed("No active socket".to_string()))
    }

    /// Second handle on the same socket, for a dedicated receive thread
    pub fn try_clone(&mut self) -> Result<UdpTransport, NetworkError> {
        let socket = self
            .ensure_connected()?
            .try_clone()
            .map_err(|e| NetworkError::ConnectionFailed(format!("UDP socket clone failed: {}", e)))?;
        Ok(UdpTransport {
            socket: Some(socket),
            server_addr: self.server_addr.clone(),
            bind_addr: self.bind_addr.clone(),
        })
    }
}

impl NetworkTransport for UdpTransport {
    fn connect(&mut self) -> Result<(), NetworkError> {
        let socket = UdpSocket::bind(&self.bind_addr)
            .map_err(|e| NetworkError::ConnectionFailed(format!("UDP bind {} failed: {}", self.bind_addr, e)))?;
        socket
            .connect(&self.server_addr)
            .map_err(|e| NetworkError::ConnectionFailed(format!("UDP connect {} failed: {}", self.server_addr, e)))?;
        socket
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|e| NetworkError::ConnectionFailed(format!("Failed to set timeout: {}", e)))?;

        tracing::info!("UdpTransport: {} -> {}", self.bind_addr, self.server_addr);
        self.socket = Some(socket);
        Ok(())
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), NetworkError> {
        let socket = self.ensure_connected()?;
        socket
            .send(payload)
            .map_err(|e| NetworkError::SendFailed(format!("UDP send failed: {}", e)))?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>, NetworkError> {
        let socket = self.ensure_connected()?;
        let mut buffer = vec![0u8; MAX_DATAGRAM];
        match socket.recv(&mut buffer) {
            Ok(len) => {
                buffer.truncate(len);
                Ok(Some(buffer))
            }
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(NetworkError::ReceiveFailed(format!("UDP receive failed: {}", e))),
        }
    }
}
