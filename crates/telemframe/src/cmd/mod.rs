use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use telemframe_frame::{Protocol, ACCEL, CONTROL, ENCODER, RPS};
use telemframe_transport::DEFAULT_BAUD_RATE;

use crate::exit::{CliError, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod monitor;
pub mod ports;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports.
    Ports(PortsArgs),
    /// Decode and print telemetry from a serial port.
    Monitor(MonitorArgs),
    /// Send a single command to the rig.
    Send(SendArgs),
    /// Encode one frame and print its wire bytes.
    Encode(EncodeArgs),
    /// Decode a captured byte dump.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Serial port (e.g. /dev/ttyUSB0, COM3).
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Wire protocol spoken by the firmware.
    #[arg(long, default_value = "binary")]
    pub protocol: Protocol,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Send START before reading and STOP on exit.
    #[arg(long)]
    pub start: bool,
    /// Serial read timeout; bounds how long Ctrl-C takes to notice (e.g. 1s, 250ms).
    #[arg(long, default_value = "1s")]
    pub read_timeout: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial port (e.g. /dev/ttyUSB0, COM3).
    pub port: String,
    /// Command to send.
    pub command: telemframe_frame::Command,
    /// Baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Wire protocol spoken by the firmware.
    #[arg(long, default_value = "binary")]
    pub protocol: Protocol,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Identifier: accel, rps, encoder, control, or a number (0xC0, 192).
    #[arg(long, short = 'i', value_parser = parse_identifier)]
    pub identifier: u8,
    /// UTF-8 payload.
    #[arg(long, conflicts_with = "hex", required_unless_present = "hex")]
    pub text: Option<String>,
    /// Hex payload (e.g. "e8 03", "e803").
    #[arg(long, conflicts_with = "text")]
    pub hex: Option<String>,
    /// Use the data prefix (device to host) instead of the command prefix.
    #[arg(long)]
    pub data_prefix: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read the capture from a file. Stdin is used when neither --file nor --hex is given.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Capture as hex.
    #[arg(long, conflicts_with = "file")]
    pub hex: Option<String>,
    /// Wire protocol of the capture.
    #[arg(long, default_value = "binary")]
    pub protocol: Protocol,
    /// Feed the decoder N bytes at a time.
    #[arg(long, default_value_t = 64)]
    pub chunk: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_identifier(input: &str) -> Result<u8, String> {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "accel" => return Ok(ACCEL),
        "rps" => return Ok(RPS),
        "encoder" => return Ok(ENCODER),
        "control" => return Ok(CONTROL),
        _ => {}
    }

    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid identifier: {input}"))
}

/// Parse hex bytes, ignoring whitespace, `:` and `,` separators and an optional `0x` per byte.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let mut digits = String::with_capacity(input.len());
    for token in input.split(|c: char| c.is_whitespace() || c == ':' || c == ',') {
        let token = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        digits.push_str(token);
    }

    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(CliError::usage(format!("invalid hex digit: {bad:?}")));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::usage("hex input has an odd number of digits"));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|err| CliError::usage(format!("invalid hex byte: {err}")))
        })
        .collect()
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_names_and_numbers() {
        assert_eq!(parse_identifier("accel"), Ok(ACCEL));
        assert_eq!(parse_identifier("Control"), Ok(CONTROL));
        assert_eq!(parse_identifier("0xA2"), Ok(RPS));
        assert_eq!(parse_identifier("163"), Ok(ENCODER));
        assert!(parse_identifier("0x1FF").is_err());
        assert!(parse_identifier("gyro").is_err());
    }

    #[test]
    fn hex_accepts_common_separators() {
        assert_eq!(parse_hex("01 a2 02").unwrap(), vec![0x01, 0xA2, 0x02]);
        assert_eq!(parse_hex("01a202").unwrap(), vec![0x01, 0xA2, 0x02]);
        assert_eq!(parse_hex("0x01,0xA2:02\n").unwrap(), vec![0x01, 0xA2, 0x02]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert_eq!(parse_hex("abc").unwrap_err().code, crate::exit::USAGE);
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
    }
}
