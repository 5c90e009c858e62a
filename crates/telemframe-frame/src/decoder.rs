use bytes::BytesMut;

use crate::codec::{decode_frame, Frame, FrameConfig, MAX_FRAME_SIZE};
use crate::stats::DecodeStats;

/// An incremental decoder fed with raw chunks from a byte stream.
///
/// Implementations own their buffer; callers push bytes in whatever chunks
/// the transport delivers and take back complete, verified messages.
pub trait StreamDecoder {
    /// The message type produced.
    type Item;

    /// Append `chunk` and return every message it completes, in stream order.
    fn feed(&mut self, chunk: &[u8]) -> Vec<Self::Item>;

    /// Forget buffered bytes (e.g. after reconnecting).
    fn reset(&mut self);

    /// Number of bytes received but not yet consumed.
    fn buffered(&self) -> usize;

    /// Counters for the lifetime of this decoder.
    fn stats(&self) -> DecodeStats;
}

/// Decoder for the binary frame protocol.
///
/// Holds only the bytes of an incomplete frame between calls. It is owned by
/// exactly one reader; wrap it in a lock if several threads must feed it.
#[derive(Debug)]
pub struct FrameCodec {
    buf: BytesMut,
    config: FrameConfig,
    stats: DecodeStats,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(MAX_FRAME_SIZE),
            config,
            stats: DecodeStats::default(),
        }
    }

    /// Append `chunk` and drain every frame that can be verified.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    /// Pull one frame out of the bytes already buffered.
    pub fn next_frame(&mut self) -> Option<Frame> {
        decode_frame(&mut self.buf, &self.config, &mut self.stats)
    }

    /// Drop every buffered byte. Counters are kept.
    pub fn reset(&mut self) {
        if !self.buf.is_empty() {
            tracing::debug!(dropped = self.buf.len(), "frame decoder reset");
        }
        self.buf.clear();
    }

    /// Number of bytes waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Counters for the lifetime of this decoder.
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl StreamDecoder for FrameCodec {
    type Item = Frame;

    fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        FrameCodec::feed(self, chunk)
    }

    fn reset(&mut self) {
        FrameCodec::reset(self)
    }

    fn buffered(&self) -> usize {
        FrameCodec::buffered(self)
    }

    fn stats(&self) -> DecodeStats {
        FrameCodec::stats(self)
    }
}
