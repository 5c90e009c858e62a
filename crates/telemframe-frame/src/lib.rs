//! Checksummed, self-resynchronizing framing for serial telemetry links.
//!
//! The rig firmware streams binary frames:
//! - a 1-byte prefix (`0x01` data, `0x02` command)
//! - a 1-byte identifier naming the payload layout
//! - a 1-byte payload length
//! - the payload
//! - a 2-byte little-endian CRC-16 over everything before it
//!
//! [`FrameCodec`] turns arbitrarily chunked bytes into verified [`Frame`]s,
//! dropping noise one byte at a time and discarding corrupted candidates
//! without losing the frames after them. [`FrameEncoder`] builds outgoing
//! command frames. The older text protocol lives in [`line`] as a separate
//! codec; [`ProtocolDecoder`] selects between the two.

pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod identifier;
pub mod line;
pub mod protocol;
pub mod reader;
pub mod stats;
pub mod telemetry;
#[cfg(feature = "async")]
pub mod tokio_codec;
pub mod writer;

pub use checksum::{crc16_ccitt_false, xor_code_points, ChecksumFn};
pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, FrameEncoder, CHECKSUM_SIZE, COMMAND_PREFIX,
    DATA_PREFIX, HEADER_SIZE, MAX_FRAME_SIZE, MAX_PAYLOAD,
};
pub use decoder::{FrameCodec, StreamDecoder};
pub use error::{FrameError, Result};
pub use identifier::{identifier_name, ACCEL, CONTROL, ENCODER, RPS};
pub use line::{encode_line, Line, LineCodec, LineConfig};
pub use protocol::{Message, Protocol, ProtocolDecoder};
pub use reader::FrameReader;
pub use stats::{DecodeEvent, DecodeStats};
pub use telemetry::{Command, Telemetry};
#[cfg(feature = "async")]
pub use tokio_codec::TelemetryCodec;
pub use writer::FrameWriter;
