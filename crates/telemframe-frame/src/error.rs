/// Errors that can occur during frame encoding, interpretation, and stream I/O.
///
/// Malformed input on the decode path is never an error: desyncs and
/// checksum mismatches are [`crate::DecodeEvent`]s.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the one-byte length field.
    #[error("invalid payload length ({size} bytes, max {max})")]
    InvalidPayloadLength { size: usize, max: usize },

    /// A frame carried an identifier this crate does not interpret.
    #[error("unknown identifier 0x{0:02X}")]
    UnknownIdentifier(u8),

    /// A legacy line carried a tag this crate does not interpret.
    #[error("unknown tag \"{0}\"")]
    UnknownTag(String),

    /// The payload size does not match the layout its identifier implies.
    #[error("payload layout mismatch for 0x{identifier:02X} (expected {expected} bytes, got {actual})")]
    PayloadLayout {
        identifier: u8,
        expected: usize,
        actual: usize,
    },

    /// The operation has no equivalent in the legacy line protocol.
    #[error("{0} is not available on the legacy line protocol")]
    LegacyUnsupported(&'static str),

    /// Text content could not be parsed.
    #[error("invalid text: {0}")]
    InvalidText(String),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
