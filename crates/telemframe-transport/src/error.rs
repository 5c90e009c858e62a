/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the specified serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// Failed to enumerate serial devices.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(serialport::Error),

    /// The serial driver rejected a port operation.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Best-effort mapping to an `std::io::ErrorKind` for callers that
    /// classify failures (exit codes, retry decisions).
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        let serial = match self {
            TransportError::Io(err) => return Some(err.kind()),
            TransportError::Open { source, .. }
            | TransportError::Enumerate(source)
            | TransportError::Serial(source) => source,
        };
        match serial.kind() {
            serialport::ErrorKind::Io(kind) => Some(kind),
            serialport::ErrorKind::NoDevice => Some(std::io::ErrorKind::NotFound),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
