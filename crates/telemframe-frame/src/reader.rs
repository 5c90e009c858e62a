use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use telemframe_transport::SerialStream;

use crate::codec::FrameConfig;
use crate::decoder::{FrameCodec, StreamDecoder};
use crate::error::{FrameError, Result};
use crate::protocol::{Protocol, ProtocolDecoder};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete, verified messages from any `Read` stream.
///
/// Handles partial reads internally; callers always get whole messages.
/// Noise and corrupted frames are skipped by the decoder and never surface
/// here.
pub struct FrameReader<T, D: StreamDecoder = FrameCodec> {
    inner: T,
    decoder: D,
    pending: VecDeque<D::Item>,
}

impl<T: Read> FrameReader<T, FrameCodec> {
    /// Create a binary frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a binary frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self::with_decoder(inner, FrameCodec::with_config(config))
    }
}

impl<T: Read, D: StreamDecoder> FrameReader<T, D> {
    /// Create a reader around any decoder.
    pub fn with_decoder(inner: T, decoder: D) -> Self {
        Self {
            inner,
            decoder,
            pending: VecDeque::new(),
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. Other
    /// I/O errors (a serial read timeout, for example) are returned as
    /// `FrameError::Io`; buffered bytes are kept and the reader can be
    /// called again.
    pub fn read_frame(&mut self) -> Result<D::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Ok(item);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend(self.decoder.feed(&chunk[..read]));
        }
    }

    /// Drop buffered bytes and any messages not yet returned.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.decoder.reset();
    }

    /// Borrow the decoder (for stats).
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Mutably borrow the decoder.
    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameReader<SerialStream, ProtocolDecoder> {
    /// Create a reader for a freshly opened serial port.
    ///
    /// Input already queued in the driver is discarded first so the decoder
    /// starts on live data.
    pub fn for_serial(inner: SerialStream, protocol: Protocol) -> Result<Self> {
        inner.clear_input().map_err(transport_to_frame_error)?;
        Ok(Self::with_decoder(inner, ProtocolDecoder::new(protocol)))
    }
}

pub(crate) fn transport_to_frame_error(err: telemframe_transport::TransportError) -> FrameError {
    match err {
        telemframe_transport::TransportError::Io(io) => FrameError::Io(io),
        other => {
            let kind = other.io_kind().unwrap_or(ErrorKind::Other);
            FrameError::Io(std::io::Error::new(kind, other.to_string()))
        }
    }
}
