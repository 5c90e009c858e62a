use tracing::{debug, warn};

use crate::identifier::identifier_name;

/// A recoverable anomaly observed while decoding.
///
/// Events are never surfaced as errors. Each one is logged through `tracing`
/// and counted in [`DecodeStats`]; decoding carries on with the next byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// The byte at the head of the buffer is not a frame prefix and was dropped.
    HeaderDesync { byte: u8 },

    /// A complete candidate frame failed checksum verification and was dropped.
    ChecksumMismatch {
        identifier: u8,
        payload_len: usize,
        received: u16,
        computed: u16,
    },

    /// A complete legacy line carried a checksum that does not match its data.
    LineChecksumMismatch {
        tag: String,
        received: u32,
        computed: u32,
    },

    /// A complete legacy line did not match `[TAG] DATA[CHECKSUM]`.
    MalformedLine { len: usize },

    /// A legacy line grew past the configured limit before its newline arrived.
    LineOverflow { discarded: usize },
}

/// Running counters for one decoder instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Messages emitted.
    pub frames: u64,
    /// Bytes dropped one at a time while hunting for a prefix.
    pub discarded_bytes: u64,
    /// Candidates (frames or lines) rejected by checksum.
    pub checksum_failures: u64,
    /// Legacy lines that could not be parsed.
    pub malformed_lines: u64,
    /// Legacy lines cut short by the length limit.
    pub overflowed_lines: u64,
}

impl DecodeStats {
    /// Count and log an event.
    pub fn record(&mut self, event: &DecodeEvent) {
        match event {
            DecodeEvent::HeaderDesync { byte } => {
                self.discarded_bytes += 1;
                debug!(byte = *byte, "header desync, dropping byte");
            }
            DecodeEvent::ChecksumMismatch {
                identifier,
                payload_len,
                received,
                computed,
            } => {
                self.checksum_failures += 1;
                warn!(
                    identifier = *identifier,
                    name = identifier_name(*identifier),
                    payload_len = *payload_len,
                    received = *received,
                    computed = *computed,
                    "frame checksum mismatch, dropping candidate"
                );
            }
            DecodeEvent::LineChecksumMismatch {
                tag,
                received,
                computed,
            } => {
                self.checksum_failures += 1;
                warn!(
                    tag = %tag,
                    received = *received,
                    computed = *computed,
                    "line checksum mismatch, dropping line"
                );
            }
            DecodeEvent::MalformedLine { len } => {
                self.malformed_lines += 1;
                debug!(len = *len, "malformed line, dropping");
            }
            DecodeEvent::LineOverflow { discarded } => {
                self.overflowed_lines += 1;
                warn!(discarded = *discarded, "line exceeded limit, discarding");
            }
        }
    }

    /// Count one emitted message.
    pub fn record_frame(&mut self) {
        self.frames += 1;
    }

    /// Total number of recoverable anomalies seen.
    pub fn anomalies(&self) -> u64 {
        self.discarded_bytes + self.checksum_failures + self.malformed_lines + self.overflowed_lines
    }
}
