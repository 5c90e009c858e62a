use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::checksum::{crc16_ccitt_false, ChecksumFn};
use crate::error::{FrameError, Result};
use crate::stats::{DecodeEvent, DecodeStats};

/// Frame header: prefix (1) + identifier (1) + payload length (1) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Trailing checksum: u16 little-endian.
pub const CHECKSUM_SIZE: usize = 2;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Largest possible frame on the wire.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD + CHECKSUM_SIZE;

/// Prefix of telemetry frames sent by the device.
pub const DATA_PREFIX: u8 = 0x01;

/// Prefix of command frames sent to the device.
pub const COMMAND_PREFIX: u8 = 0x02;

/// A checksum-verified message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// What the payload means.
    pub identifier: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(identifier: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            identifier,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CHECKSUM_SIZE
    }
}

/// Configuration shared by the decoder and the encoder.
#[derive(Debug, Clone, Copy)]
pub struct FrameConfig {
    /// Prefix the decoder synchronizes on.
    pub data_prefix: u8,
    /// Prefix the encoder writes.
    pub command_prefix: u8,
    /// Checksum over prefix through payload. Default: CRC-16/CCITT-FALSE.
    pub checksum: ChecksumFn,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            data_prefix: DATA_PREFIX,
            command_prefix: COMMAND_PREFIX,
            checksum: crc16_ccitt_false,
        }
    }
}

impl FrameConfig {
    /// The device's view of the link: decode command frames, encode data frames.
    pub fn device_side() -> Self {
        Self {
            data_prefix: COMMAND_PREFIX,
            command_prefix: DATA_PREFIX,
            ..Self::default()
        }
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬────────────┬────────┬─────────────┬──────────────┐
/// │ Prefix │ Identifier │ Length │ Payload     │ Checksum     │
/// │ (1B)   │ (1B)       │ (1B)   │ (Length B)  │ (2B LE)      │
/// └────────┴────────────┴────────┴─────────────┴──────────────┘
/// ```
///
/// The checksum covers every byte before it.
pub fn encode_frame(
    prefix: u8,
    identifier: u8,
    payload: &[u8],
    checksum: ChecksumFn,
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::InvalidPayloadLength {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len() + CHECKSUM_SIZE);
    let start = dst.len();
    dst.put_u8(prefix);
    dst.put_u8(identifier);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    let crc = checksum(&dst[start..]);
    dst.put_u16_le(crc);
    Ok(())
}

/// Decode the next verified frame from a buffer.
///
/// Returns `None` once the buffer cannot yield another frame without more
/// data; any partial frame is left in place. Bytes that cannot start a frame
/// are dropped one at a time, and candidates that fail verification are
/// consumed whole, so calling this again never revisits a byte.
pub fn decode_frame(
    src: &mut BytesMut,
    config: &FrameConfig,
    stats: &mut DecodeStats,
) -> Option<Frame> {
    loop {
        if src.len() < HEADER_SIZE {
            return None; // Need more data
        }

        if src[0] != config.data_prefix {
            let byte = src[0];
            src.advance(1);
            stats.record(&DecodeEvent::HeaderDesync { byte });
            continue;
        }

        let identifier = src[1];
        let payload_len = src[2] as usize;
        let needed = HEADER_SIZE + payload_len + CHECKSUM_SIZE;
        if src.len() < needed {
            return None; // Need more data
        }

        let mut candidate = src.split_to(needed);
        let body_len = needed - CHECKSUM_SIZE;
        debug_assert_eq!(body_len, HEADER_SIZE + payload_len);

        let received = u16::from_le_bytes([candidate[body_len], candidate[body_len + 1]]);
        let computed = (config.checksum)(&candidate[..body_len]);
        if received != computed {
            stats.record(&DecodeEvent::ChecksumMismatch {
                identifier,
                payload_len,
                received,
                computed,
            });
            continue;
        }

        candidate.advance(HEADER_SIZE);
        candidate.truncate(payload_len);
        stats.record_frame();
        return Some(Frame {
            identifier,
            payload: candidate.freeze(),
        });
    }
}

/// Builds outgoing frames.
///
/// Holds configuration only, so one encoder can be copied freely and used
/// from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    prefix: u8,
    checksum: ChecksumFn,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(&FrameConfig::default())
    }
}

impl FrameEncoder {
    /// Encoder writing `config.command_prefix`.
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            prefix: config.command_prefix,
            checksum: config.checksum,
        }
    }

    /// Encoder for host-to-device command frames.
    pub fn command() -> Self {
        Self::default()
    }

    /// Encoder for device-to-host data frames, as the firmware writes them.
    pub fn data() -> Self {
        Self::new(&FrameConfig::device_side())
    }

    /// The prefix this encoder writes.
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Encode one frame into a fresh buffer.
    pub fn encode(&self, identifier: u8, payload: &[u8]) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(HEADER_SIZE + payload.len() + CHECKSUM_SIZE);
        self.encode_into(identifier, payload, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Append one encoded frame to `dst`.
    pub fn encode_into(&self, identifier: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
        encode_frame(self.prefix, identifier, payload, self.checksum, dst)
    }
}
