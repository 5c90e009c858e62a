use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use telemframe_transport::SerialStream;

use crate::codec::{Frame, FrameEncoder, MAX_FRAME_SIZE};
use crate::error::{FrameError, Result};
use crate::protocol::Protocol;
use crate::reader::transport_to_frame_error;
use crate::telemetry::Command;

/// Writes complete frames (or legacy command lines) to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    encoder: FrameEncoder,
    protocol: Protocol,
}

impl<T: Write> FrameWriter<T> {
    /// Create a binary command writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_encoder(inner, FrameEncoder::command())
    }

    /// Create a binary writer with an explicit encoder.
    pub fn with_encoder(inner: T, encoder: FrameEncoder) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_FRAME_SIZE),
            encoder,
            protocol: Protocol::Binary,
        }
    }

    /// Create a writer speaking `protocol`.
    pub fn with_protocol(inner: T, protocol: Protocol) -> Self {
        Self {
            protocol,
            ..Self::new(inner)
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.identifier, frame.payload.as_ref())
    }

    /// Encode and send a payload under an identifier.
    pub fn send(&mut self, identifier: u8, payload: &[u8]) -> Result<()> {
        if self.protocol == Protocol::Legacy {
            return Err(FrameError::LegacyUnsupported("binary frames"));
        }

        self.buf.clear();
        self.encoder.encode_into(identifier, payload, &mut self.buf)?;
        self.write_buf()
    }

    /// Send a command in whichever form the protocol expects.
    pub fn send_command(&mut self, command: Command) -> Result<()> {
        tracing::debug!(%command, protocol = %self.protocol, "sending command");
        match self.protocol {
            Protocol::Binary => {
                let frame = command.to_frame();
                self.write_frame(&frame)
            }
            Protocol::Legacy => {
                self.buf.clear();
                self.buf.extend_from_slice(command.legacy_line().as_bytes());
                self.write_buf()
            }
        }
    }

    fn write_buf(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// The encoder used for binary frames.
    pub fn encoder(&self) -> &FrameEncoder {
        &self.encoder
    }

    /// The protocol this writer speaks.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameWriter<SerialStream> {
    /// Create a writer on a clone of `stream`, leaving the original for reading.
    pub fn for_serial(stream: &SerialStream, protocol: Protocol) -> Result<Self> {
        let cloned = stream.try_clone().map_err(transport_to_frame_error)?;
        Ok(Self::with_protocol(cloned, protocol))
    }
}
