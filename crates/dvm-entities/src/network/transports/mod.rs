pub mod udp;

/// Datagram transport to the FNE master.
///
/// `receive` blocks for at most the transport's read timeout and returns
/// `Ok(None)` when nothing arrived, so receive loops can poll a running flag.
pub trait NetworkTransport: Send {
    /// Connect or reconnect the transport. Destroys any existing connection.
    fn connect(&mut self) -> Result<(), NetworkError>;

    fn send(&mut self, payload: &[u8]) -> Result<(), NetworkError>;

    fn receive(&mut self) -> Result<Option<Vec<u8>>, NetworkError>;
}

/// Network-related errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    ConnectionFailed(String),
    SendFailed(String),
    ReceiveFailed(String),
    /// Datagram too short or with an unknown function code
    Malformed(String),
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            NetworkError::SendFailed(msg) => write!(f, "Send failed: {}", msg),
            NetworkError::ReceiveFailed(msg) => write!(f, "Receive failed: {}", msg),
            NetworkError::Malformed(msg) => write!(f, "Malformed datagram: {}", msg),
        }
    }
}

impl std::error::Error for NetworkError {}
