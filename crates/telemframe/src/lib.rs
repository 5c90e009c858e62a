//! Checksummed, self-resynchronizing telemetry framing over serial links.
//!
//! A data-acquisition rig streams accelerometer, RPS and encoder samples to
//! the host as binary frames and accepts `start` / `stop` commands back.
//! The decoder tolerates line noise, dropped bytes and arbitrary read
//! chunking; corrupted frames are discarded without losing the ones after
//! them.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial port access and enumeration
//! - [`frame`]: wire format, decoder, encoder, legacy line protocol
//!
//! ```
//! use telemframe::frame::{FrameCodec, FrameEncoder, Telemetry, RPS};
//!
//! let wire = FrameEncoder::data().encode(RPS, &1000u16.to_le_bytes()).unwrap();
//! let mut codec = FrameCodec::new();
//! let frames = codec.feed(&wire);
//! assert_eq!(Telemetry::from_frame(&frames[0]).unwrap(), Telemetry::Rps(1000.0));
//! ```

/// Re-export transport types.
pub mod transport {
    pub use telemframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use telemframe_frame::*;
}
