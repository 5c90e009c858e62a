//! Legacy line protocol.
//!
//! Older firmware prints one message per line:
//!
//! ```text
//! [TAG] DATA[CHECKSUM]\n
//! ```
//!
//! `CHECKSUM` is the decimal XOR of the character codes of `DATA`. This codec
//! shares nothing with [`crate::FrameCodec`] beyond the [`StreamDecoder`]
//! trait.

use bytes::{Buf, BytesMut};

use crate::checksum::xor_code_points;
use crate::decoder::StreamDecoder;
use crate::stats::{DecodeEvent, DecodeStats};

/// Default longest line accepted before the decoder gives up on it.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Configuration for [`LineCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    /// Lines longer than this (without their newline) are discarded.
    pub max_line_len: usize,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// A checksum-verified legacy message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Message kind, e.g. `MPU`, `RPS`, `ENCSIN`.
    pub tag: String,
    /// Everything between the tag and the checksum.
    pub data: String,
}

impl Line {
    /// Create a line from its tag and data.
    pub fn new(tag: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            data: data.into(),
        }
    }

    /// `KEY=VALUE` pairs in `data`. Tokens without `=` are skipped.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data
            .split_whitespace()
            .filter_map(|token| token.split_once('='))
    }

    /// Value of the first field named `key`.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Build a checksummed line, newline included.
pub fn encode_line(tag: &str, data: &str) -> String {
    format!("[{tag}] {data}[{}]\n", xor_code_points(data))
}

struct ParsedLine<'a> {
    tag: &'a str,
    data: &'a str,
    checksum: u32,
}

fn parse_line(text: &str) -> Option<ParsedLine<'_>> {
    let rest = text.strip_prefix('[')?;
    let (tag, rest) = rest.split_once("] ")?;
    if tag.is_empty() || !tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let rest = rest.strip_suffix(']')?;
    let (data, digits) = rest.rsplit_once('[')?;
    if data.is_empty() || data.contains('[') {
        return None;
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(ParsedLine {
        tag,
        data,
        checksum: digits.parse().ok()?,
    })
}

/// Decoder for the legacy line protocol.
#[derive(Debug)]
pub struct LineCodec {
    buf: BytesMut,
    /// Bytes of `buf` already known to contain no newline.
    scanned: usize,
    /// Dropping the rest of an overlong line.
    skipping: bool,
    config: LineConfig,
    stats: DecodeStats,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(LineConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: LineConfig) -> Self {
        Self {
            buf: BytesMut::new(),
            scanned: 0,
            skipping: false,
            config,
            stats: DecodeStats::default(),
        }
    }

    /// Append `chunk` and return every verified line it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Line> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();

        loop {
            let newline = self.buf[self.scanned..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|pos| self.scanned + pos);

            let Some(end) = newline else {
                self.scanned = self.buf.len();
                if !self.skipping && self.buf.len() > self.config.max_line_len {
                    self.stats.record(&DecodeEvent::LineOverflow {
                        discarded: self.buf.len(),
                    });
                    self.skipping = true;
                }
                if self.skipping {
                    self.buf.clear();
                    self.scanned = 0;
                }
                return lines;
            };

            let raw = self.buf.split_to(end);
            self.buf.advance(1);
            self.scanned = 0;

            if self.skipping {
                self.skipping = false;
                continue;
            }
            if raw.len() > self.config.max_line_len {
                self.stats.record(&DecodeEvent::LineOverflow {
                    discarded: raw.len(),
                });
                continue;
            }
            if let Some(line) = self.verify(&raw) {
                self.stats.record_frame();
                lines.push(line);
            }
        }
    }

    fn verify(&mut self, raw: &[u8]) -> Option<Line> {
        let Ok(text) = std::str::from_utf8(raw) else {
            self.stats.record(&DecodeEvent::MalformedLine { len: raw.len() });
            return None;
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(parsed) = parse_line(text) else {
            self.stats.record(&DecodeEvent::MalformedLine { len: text.len() });
            return None;
        };

        let computed = xor_code_points(parsed.data);
        if parsed.checksum != computed {
            self.stats.record(&DecodeEvent::LineChecksumMismatch {
                tag: parsed.tag.to_string(),
                received: parsed.checksum,
                computed,
            });
            return None;
        }

        Some(Line::new(parsed.tag, parsed.data))
    }

    /// Drop every buffered byte. Counters are kept.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.scanned = 0;
        self.skipping = false;
    }

    /// Number of bytes waiting for a newline.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Counters for the lifetime of this decoder.
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl StreamDecoder for LineCodec {
    type Item = Line;

    fn feed(&mut self, chunk: &[u8]) -> Vec<Line> {
        LineCodec::feed(self, chunk)
    }

    fn reset(&mut self) {
        LineCodec::reset(self)
    }

    fn buffered(&self) -> usize {
        LineCodec::buffered(self)
    }

    fn stats(&self) -> DecodeStats {
        LineCodec::stats(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_checksummed_line() {
        let wire = encode_line("MPU", "X=1.00 Y=-2.50 Z=3.00");
        let mut codec = LineCodec::new();
        let lines = codec.feed(wire.as_bytes());

        assert_eq!(lines, vec![Line::new("MPU", "X=1.00 Y=-2.50 Z=3.00")]);
        assert_eq!(lines[0].field("Y"), Some("-2.50"));
        assert_eq!(codec.buffered(), 0);
    }

    #[test]
    fn wide_characters_use_full_code_points() {
        let mut codec = LineCodec::new();
        let input = "[NOTE] \u{0100}[256]\n[NOTE] \u{0100}[0]\n";
        assert_eq!(codec.feed(input.as_bytes()), vec![Line::new("NOTE", "\u{0100}")]);
        assert_eq!(codec.stats().checksum_failures, 1);
        assert_eq!(encode_line("NOTE", "\u{0100}"), "[NOTE] \u{0100}[256]\n");
    }

    #[test]
    fn tolerates_crlf_and_surrounding_space() {
        let wire = encode_line("RPS", "12.5000").replace('\n', "\r\n");
        let mut codec = LineCodec::new();
        let mut input = b"  ".to_vec();
        input.extend_from_slice(wire.as_bytes());

        assert_eq!(codec.feed(&input), vec![Line::new("RPS", "12.5000")]);
    }

    #[test]
    fn wrong_checksum_is_dropped() {
        let data = "12.5000";
        let bad = format!("[RPS] {data}[{}]\n", xor_code_points(data) ^ 0x01);
        let good = encode_line("ENCSIN", "4.75");

        let mut codec = LineCodec::new();
        let lines = codec.feed(format!("{bad}{good}").as_bytes());

        assert_eq!(lines, vec![Line::new("ENCSIN", "4.75")]);
        assert_eq!(codec.stats().checksum_failures, 1);
    }

    #[test]
    fn malformed_lines_are_counted() {
        let mut codec = LineCodec::new();
        let input = b"Coleta de dados iniciada...\n[RPS]1.0[3]\n[RPS] 1.0[x]\n\n";
        assert!(codec.feed(input).is_empty());
        assert_eq!(codec.stats().malformed_lines, 3);
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let mut codec = LineCodec::new();
        assert!(codec.feed(&[0xFF, 0xFE, b'\n']).is_empty());
        assert_eq!(codec.stats().malformed_lines, 1);
    }

    #[test]
    fn chunked_lines_match_single_feed() {
        let mut wire = String::new();
        wire.push_str(&encode_line("MPU", "X=0.10 Y=0.20 Z=9806.65"));
        wire.push_str(&encode_line("RPS", "1.0000"));
        wire.push_str(&encode_line("ENCSIN", "-5.00"));
        let bytes = wire.as_bytes();

        let expected = LineCodec::new().feed(bytes);
        assert_eq!(expected.len(), 3);

        for split in 0..=bytes.len() {
            let mut codec = LineCodec::new();
            let mut got = codec.feed(&bytes[..split]);
            got.extend(codec.feed(&bytes[split..]));
            assert_eq!(got, expected, "split at {split}");
        }

        let mut codec = LineCodec::new();
        let got: Vec<Line> = bytes.iter().flat_map(|b| codec.feed(&[*b])).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn overlong_line_is_skipped_up_to_newline() {
        let mut codec = LineCodec::with_config(LineConfig { max_line_len: 16 });
        assert!(codec.feed(&[b'a'; 20]).is_empty());
        assert_eq!(codec.buffered(), 0);
        assert!(codec.feed(&[b'b'; 40]).is_empty());
        assert_eq!(codec.buffered(), 0);

        let tail = encode_line("RPS", "2.0");
        let mut input = b"zz\n".to_vec();
        input.extend_from_slice(tail.as_bytes());
        assert_eq!(codec.feed(&input), vec![Line::new("RPS", "2.0")]);
        assert_eq!(codec.stats().overflowed_lines, 1);
    }

    #[test]
    fn reset_drops_partial_line() {
        let wire = encode_line("RPS", "3.0");
        let mut codec = LineCodec::new();
        codec.feed(&wire.as_bytes()[..4]);
        codec.reset();
        assert_eq!(codec.buffered(), 0);
        assert_eq!(codec.feed(wire.as_bytes()), vec![Line::new("RPS", "3.0")]);
    }

    #[test]
    fn fields_skip_tokens_without_equals() {
        let line = Line::new("MPU", "X=1 junk Y=2");
        let fields: Vec<_> = line.fields().collect();
        assert_eq!(fields, vec![("X", "1"), ("Y", "2")]);
        assert_eq!(line.field("Z"), None);
    }
}
