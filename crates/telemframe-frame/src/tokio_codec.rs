//! `tokio_util::codec` adapter for the binary protocol.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, Frame, FrameConfig, FrameEncoder};
use crate::error::FrameError;
use crate::identifier::CONTROL;
use crate::stats::DecodeStats;
use crate::telemetry::Command;

/// Frames a byte stream for `FramedRead` / `FramedWrite`.
///
/// Decoding never fails on malformed input; noise and corrupted frames are
/// skipped exactly as [`crate::FrameCodec`] skips them.
#[derive(Debug, Clone)]
pub struct TelemetryCodec {
    config: FrameConfig,
    encoder: FrameEncoder,
    stats: DecodeStats,
}

impl Default for TelemetryCodec {
    fn default() -> Self {
        Self::new(FrameConfig::default())
    }
}

impl TelemetryCodec {
    pub fn new(config: FrameConfig) -> Self {
        Self {
            config,
            encoder: FrameEncoder::new(&config),
            stats: DecodeStats::default(),
        }
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }
}

impl Decoder for TelemetryCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        Ok(decode_frame(src, &self.config, &mut self.stats))
    }

    /// Drains what is left at end of stream. A trailing partial frame or
    /// noise is dropped, never reported as an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        if let Some(frame) = decode_frame(src, &self.config, &mut self.stats) {
            return Ok(Some(frame));
        }
        if !src.is_empty() {
            tracing::debug!(dropped = src.len(), "stream ended inside a frame");
            src.clear();
        }
        Ok(None)
    }
}

impl Encoder<Frame> for TelemetryCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        self.encoder.encode_into(item.identifier, item.payload.as_ref(), dst)
    }
}

impl Encoder<Command> for TelemetryCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), FrameError> {
        self.encoder.encode_into(CONTROL, item.as_str().as_bytes(), dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::identifier::RPS;

    #[tokio::test]
    async fn framed_read_skips_noise_and_bad_frames() {
        let enc = FrameEncoder::data();
        let mut wire = vec![0xEE, 0x00];
        let mut bad = enc.encode(RPS, &[1, 0]).unwrap().to_vec();
        bad[3] ^= 0x40;
        wire.extend_from_slice(&bad);
        wire.extend_from_slice(&enc.encode(RPS, &[2, 0]).unwrap());
        wire.extend_from_slice(&enc.encode(CONTROL, b"done").unwrap());

        let mut framed = FramedRead::new(wire.as_slice(), TelemetryCodec::default());
        let mut frames = Vec::new();
        while let Some(frame) = framed.next().await {
            frames.push(frame.unwrap());
        }

        assert_eq!(
            frames,
            vec![Frame::new(RPS, vec![2u8, 0]), Frame::new(CONTROL, "done")]
        );
        let stats = framed.decoder().stats();
        assert_eq!(stats.discarded_bytes, 2);
        assert_eq!(stats.checksum_failures, 1);
    }

    #[tokio::test]
    async fn trailing_bytes_at_eof_are_dropped() {
        let enc = FrameEncoder::data();
        let frame = enc.encode(RPS, &[0xe8, 0x03]).unwrap().to_vec();
        let partial = enc.encode(CONTROL, b"late").unwrap()[..4].to_vec();

        for tail in [vec![0xEE], partial, vec![0x01]] {
            let wire = [frame.clone(), tail.clone()].concat();
            let mut framed = FramedRead::new(wire.as_slice(), TelemetryCodec::default());
            let mut frames = Vec::new();
            while let Some(item) = framed.next().await {
                frames.push(item.unwrap());
            }

            assert_eq!(
                frames,
                vec![Frame::new(RPS, vec![0xe8u8, 0x03])],
                "tail {tail:02x?}"
            );
        }
    }

    #[tokio::test]
    async fn framed_write_encodes_commands_and_frames() {
        let mut framed = FramedWrite::new(Vec::<u8>::new(), TelemetryCodec::default());
        framed.send(Command::Start).await.unwrap();
        framed.send(Frame::new(CONTROL, "stop")).await.unwrap();

        let wire = framed.into_inner();
        let mut device = crate::decoder::FrameCodec::with_config(FrameConfig::device_side());
        let decoded = device.feed(&wire);
        assert_eq!(
            decoded,
            vec![Frame::new(CONTROL, "start"), Frame::new(CONTROL, "stop")]
        );
    }

    #[tokio::test]
    async fn oversized_frame_is_an_encode_error() {
        let mut framed = FramedWrite::new(Vec::<u8>::new(), TelemetryCodec::default());
        let err = framed
            .send(Frame::new(CONTROL, vec![0u8; 300]))
            .await
            .unwrap_err();
        assert!(matches!(err, FrameError::InvalidPayloadLength { size: 300, .. }));
    }
}
