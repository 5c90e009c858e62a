//! Protocol selection.
//!
//! The binary and legacy wire formats are separate codecs. [`ProtocolDecoder`]
//! picks one at construction time and forwards to it; their state machines
//! never mix.

use std::fmt;
use std::str::FromStr;

use crate::codec::{Frame, FrameConfig};
use crate::decoder::{FrameCodec, StreamDecoder};
use crate::error::{FrameError, Result};
use crate::identifier::identifier_name;
use crate::line::{Line, LineCodec, LineConfig};
use crate::stats::DecodeStats;
use crate::telemetry::Telemetry;

/// Which wire format a link speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    /// Prefix + identifier + length + payload + CRC-16 frames.
    #[default]
    Binary,
    /// `[TAG] DATA[CHECKSUM]` text lines.
    Legacy,
}

impl Protocol {
    /// Lowercase name, as accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Binary => "binary",
            Protocol::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(Protocol::Binary),
            "legacy" | "text" => Ok(Protocol::Legacy),
            other => Err(FrameError::InvalidText(format!(
                "unknown protocol {other:?} (expected binary or legacy)"
            ))),
        }
    }
}

/// A verified message from either protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Frame(Frame),
    Line(Line),
}

impl Message {
    /// Interpret the message as a telemetry sample.
    pub fn telemetry(&self) -> Result<Telemetry> {
        match self {
            Message::Frame(frame) => Telemetry::from_frame(frame),
            Message::Line(line) => Telemetry::from_line(line),
        }
    }

    /// Identifier name or line tag.
    pub fn kind(&self) -> &str {
        match self {
            Message::Frame(frame) => identifier_name(frame.identifier),
            Message::Line(line) => line.tag.as_str(),
        }
    }

    /// Size of the raw message body.
    pub fn payload_len(&self) -> usize {
        match self {
            Message::Frame(frame) => frame.payload.len(),
            Message::Line(line) => line.data.len(),
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        Message::Frame(frame)
    }
}

impl From<Line> for Message {
    fn from(line: Line) -> Self {
        Message::Line(line)
    }
}

/// A decoder for whichever protocol the link is configured with.
#[derive(Debug)]
pub enum ProtocolDecoder {
    Binary(FrameCodec),
    Legacy(LineCodec),
}

impl ProtocolDecoder {
    /// Decoder with default settings for `protocol`.
    pub fn new(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Binary => Self::binary(FrameConfig::default()),
            Protocol::Legacy => Self::legacy(LineConfig::default()),
        }
    }

    /// Binary frame decoder with explicit configuration.
    pub fn binary(config: FrameConfig) -> Self {
        ProtocolDecoder::Binary(FrameCodec::with_config(config))
    }

    /// Legacy line decoder with explicit configuration.
    pub fn legacy(config: LineConfig) -> Self {
        ProtocolDecoder::Legacy(LineCodec::with_config(config))
    }

    /// The protocol this decoder speaks.
    pub fn protocol(&self) -> Protocol {
        match self {
            ProtocolDecoder::Binary(_) => Protocol::Binary,
            ProtocolDecoder::Legacy(_) => Protocol::Legacy,
        }
    }

    /// Append `chunk` and return every message it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Message> {
        match self {
            ProtocolDecoder::Binary(codec) => {
                codec.feed(chunk).into_iter().map(Message::Frame).collect()
            }
            ProtocolDecoder::Legacy(codec) => {
                codec.feed(chunk).into_iter().map(Message::Line).collect()
            }
        }
    }

    /// Drop every buffered byte. Counters are kept.
    pub fn reset(&mut self) {
        match self {
            ProtocolDecoder::Binary(codec) => codec.reset(),
            ProtocolDecoder::Legacy(codec) => codec.reset(),
        }
    }

    /// Number of bytes waiting for the rest of a message.
    pub fn buffered(&self) -> usize {
        match self {
            ProtocolDecoder::Binary(codec) => codec.buffered(),
            ProtocolDecoder::Legacy(codec) => codec.buffered(),
        }
    }

    /// Counters of the wrapped decoder.
    pub fn stats(&self) -> DecodeStats {
        match self {
            ProtocolDecoder::Binary(codec) => codec.stats(),
            ProtocolDecoder::Legacy(codec) => codec.stats(),
        }
    }
}

impl StreamDecoder for ProtocolDecoder {
    type Item = Message;

    fn feed(&mut self, chunk: &[u8]) -> Vec<Message> {
        ProtocolDecoder::feed(self, chunk)
    }

    fn reset(&mut self) {
        ProtocolDecoder::reset(self)
    }

    fn buffered(&self) -> usize {
        ProtocolDecoder::buffered(self)
    }

    fn stats(&self) -> DecodeStats {
        ProtocolDecoder::stats(self)
    }
}
