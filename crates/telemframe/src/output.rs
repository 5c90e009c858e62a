use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use telemframe_frame::{identifier_name, DecodeStats, Message};
use telemframe_transport::{PortInfo, PortKind};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<u8>,
    payload_size: usize,
    payload: String,
    telemetry: Option<String>,
    timestamp: String,
}

pub fn print_message(message: &Message, format: OutputFormat) {
    let telemetry = message.telemetry().ok().map(|sample| sample.to_string());
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                kind: message.kind(),
                identifier: match message {
                    Message::Frame(frame) => Some(frame.identifier),
                    Message::Line(_) => None,
                },
                payload_size: message.payload_len(),
                payload: payload_preview(message),
                telemetry,
                timestamp: now_unix_millis(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "SIZE", "VALUE"])
                .add_row(vec![
                    message.kind().to_string(),
                    message.payload_len().to_string(),
                    telemetry.unwrap_or_else(|| payload_preview(message)),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => match telemetry {
            Some(value) => println!("{:<8} {value}", message.kind()),
            None => println!(
                "{:<8} size={} payload={}",
                message.kind(),
                message.payload_len(),
                payload_preview(message)
            ),
        },
        OutputFormat::Raw => match message {
            Message::Frame(frame) => print_raw(frame.payload.as_ref()),
            Message::Line(line) => println!("[{}] {}", line.tag, line.data),
        },
    }
}

#[derive(Serialize)]
struct EncodedOutput {
    prefix: u8,
    identifier: u8,
    identifier_name: &'static str,
    size: usize,
    hex: String,
}

/// Print a frame produced by `encode`.
pub fn print_encoded(wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                prefix: wire[0],
                identifier: wire[1],
                identifier_name: identifier_name(wire[1]),
                size: wire.len(),
                hex: to_hex(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", to_hex(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    vid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<&'a str>,
}

impl<'a> From<&'a PortInfo> for PortOutput<'a> {
    fn from(port: &'a PortInfo) -> Self {
        let (vid, pid, product) = match &port.kind {
            PortKind::Usb {
                vid,
                pid,
                product,
                manufacturer,
            } => (
                Some(*vid),
                Some(*pid),
                product.as_deref().or(manufacturer.as_deref()),
            ),
            _ => (None, None, None),
        };
        Self {
            name: &port.name,
            kind: port.kind.label(),
            vid,
            pid,
            product,
        }
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    let rows: Vec<PortOutput<'_>> = ports.iter().map(PortOutput::from).collect();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "KIND", "VID:PID", "PRODUCT"]);
            for row in &rows {
                table.add_row(vec![
                    row.name.to_string(),
                    row.kind.to_string(),
                    usb_ids(row),
                    row.product.unwrap_or("").to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in &rows {
                println!("{}\t{}\t{}", row.name, row.kind, usb_ids(row));
            }
        }
    }
}

fn usb_ids(row: &PortOutput<'_>) -> String {
    match (row.vid, row.pid) {
        (Some(vid), Some(pid)) => format!("{vid:04x}:{pid:04x}"),
        _ => "-".to_string(),
    }
}

/// Decoder counters, always on stderr so stdout stays machine-readable.
pub fn print_stats(stats: &DecodeStats) {
    eprintln!(
        "messages={} discarded_bytes={} checksum_failures={} malformed_lines={} overflowed_lines={}",
        stats.frames,
        stats.discarded_bytes,
        stats.checksum_failures,
        stats.malformed_lines,
        stats.overflowed_lines
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn payload_preview(message: &Message) -> String {
    match message {
        Message::Frame(frame) => match std::str::from_utf8(&frame.payload) {
            Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
            _ => to_hex(frame.payload.as_ref()),
        },
        Message::Line(line) => line.data.clone(),
    }
}

fn now_unix_millis() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemframe_frame::{Frame, Line, RPS};

    #[test]
    fn hex_is_lowercase_space_separated() {
        assert_eq!(to_hex(&[0x01, 0xA2, 0x0f]), "01 a2 0f");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn binary_payload_preview_falls_back_to_hex() {
        let frame = Message::Frame(Frame::new(RPS, vec![0xe8u8, 0x03]));
        assert_eq!(payload_preview(&frame), "e8 03");

        let line = Message::Line(Line::new("RPS", "1.5"));
        assert_eq!(payload_preview(&line), "1.5");
    }

    #[test]
    fn usb_port_row_carries_ids() {
        let port = PortInfo {
            name: "/dev/ttyUSB0".to_string(),
            kind: PortKind::Usb {
                vid: 0x10c4,
                pid: 0xea60,
                manufacturer: Some("Silicon Labs".to_string()),
                product: None,
            },
        };
        let row = PortOutput::from(&port);
        assert_eq!(usb_ids(&row), "10c4:ea60");
        assert_eq!(row.product, Some("Silicon Labs"));
    }
}
