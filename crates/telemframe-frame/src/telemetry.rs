//! Application-level meaning of decoded messages.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::codec::{Frame, FrameEncoder};
use crate::error::{FrameError, Result};
use crate::identifier::{self, ACCEL, CONTROL, ENCODER, RPS};
use crate::line::Line;

/// One interpreted telemetry sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Telemetry {
    /// Accelerometer triple in mm/s².
    Accel { x: f32, y: f32, z: f32 },
    /// Shaft revolutions per second.
    Rps(f32),
    /// Encoder reading. The legacy firmware reports the reconstructed sine value.
    Encoder(f32),
    /// Control text from the device.
    Control(String),
}

impl Telemetry {
    /// Interpret a binary frame according to its identifier.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let payload = frame.payload.as_ref();
        if let Some(expected) = identifier::payload_size(frame.identifier) {
            if payload.len() != expected {
                return Err(FrameError::PayloadLayout {
                    identifier: frame.identifier,
                    expected,
                    actual: payload.len(),
                });
            }
        }

        match frame.identifier {
            ACCEL => Ok(Telemetry::Accel {
                x: f32_le(&payload[0..4]),
                y: f32_le(&payload[4..8]),
                z: f32_le(&payload[8..12]),
            }),
            RPS => Ok(Telemetry::Rps(f32::from(u16_le(payload)))),
            ENCODER => Ok(Telemetry::Encoder(f32::from(u16_le(payload)))),
            CONTROL => std::str::from_utf8(payload)
                .map(|text| Telemetry::Control(text.to_string()))
                .map_err(|err| FrameError::InvalidText(format!("control payload: {err}"))),
            other => Err(FrameError::UnknownIdentifier(other)),
        }
    }

    /// Interpret a legacy line according to its tag.
    pub fn from_line(line: &Line) -> Result<Self> {
        match line.tag.as_str() {
            "MPU" => {
                let axis = |key: &str| -> Result<f32> {
                    let value = line.field(key).ok_or_else(|| {
                        FrameError::InvalidText(format!("MPU line missing {key}="))
                    })?;
                    parse_f32(value)
                };
                Ok(Telemetry::Accel {
                    x: axis("X")?,
                    y: axis("Y")?,
                    z: axis("Z")?,
                })
            }
            "RPS" => Ok(Telemetry::Rps(parse_f32(line.data.trim())?)),
            "ENCSIN" => Ok(Telemetry::Encoder(parse_f32(line.data.trim())?)),
            other => Err(FrameError::UnknownTag(other.to_string())),
        }
    }

    /// Short name of the sample kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Telemetry::Accel { .. } => "ACCEL",
            Telemetry::Rps(_) => "RPS",
            Telemetry::Encoder(_) => "ENCODER",
            Telemetry::Control(_) => "CONTROL",
        }
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Telemetry::Accel { x, y, z } => write!(f, "X={x:.2} Y={y:.2} Z={z:.2}"),
            Telemetry::Rps(v) => write!(f, "RPS={v:.4}"),
            Telemetry::Encoder(v) => write!(f, "ENCODER={v:.2}"),
            Telemetry::Control(text) => write!(f, "CONTROL={text}"),
        }
    }
}

fn f32_le(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn parse_f32(text: &str) -> Result<f32> {
    text.parse()
        .map_err(|_| FrameError::InvalidText(format!("not a number: {text:?}")))
}

/// Commands the host sends to the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a data collection run (spins up the motor).
    Start,
    /// Stop the current run.
    Stop,
}

impl Command {
    /// Command text carried in the binary control frame.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
        }
    }

    /// Binary control frame for this command.
    pub fn encode(self, encoder: &FrameEncoder) -> Result<Bytes> {
        encoder.encode(CONTROL, self.as_str().as_bytes())
    }

    /// The frame this command travels in.
    pub fn to_frame(self) -> Frame {
        Frame::new(CONTROL, self.as_str())
    }

    /// Newline-terminated text for the legacy line protocol.
    pub fn legacy_line(self) -> String {
        format!("{}\n", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            other => Err(FrameError::InvalidText(format!(
                "unknown command {other:?} (expected start or stop)"
            ))),
        }
    }
}
