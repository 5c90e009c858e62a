//! Serial port transport for telemframe links.
//!
//! This is the lowest layer of telemframe. It opens a serial device with a
//! [`SerialConfig`] and hands back a [`SerialStream`] that implements
//! `Read + Write`, so the framing layer never sees the platform port type.

pub mod config;
pub mod error;
pub mod ports;
pub mod stream;

pub use config::{SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
pub use error::{Result, TransportError};
pub use ports::{available_ports, PortInfo, PortKind};
pub use stream::SerialStream;
