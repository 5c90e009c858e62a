//! Frame identifiers understood by the rig firmware.

/// Accelerometer sample: three little-endian f32 values (x, y, z in mm/s²).
pub const ACCEL: u8 = 0xA1;

/// Shaft speed in revolutions per second: one little-endian u16.
pub const RPS: u8 = 0xA2;

/// Encoder reading: one little-endian u16.
pub const ENCODER: u8 = 0xA3;

/// Control text (commands and their acknowledgements), UTF-8.
pub const CONTROL: u8 = 0xC0;

/// Returns a human-readable name for an identifier.
pub fn identifier_name(id: u8) -> &'static str {
    match id {
        ACCEL => "ACCEL",
        RPS => "RPS",
        ENCODER => "ENCODER",
        CONTROL => "CONTROL",
        _ => "UNKNOWN",
    }
}

/// Returns true if this crate knows how to interpret the identifier.
pub fn is_known(id: u8) -> bool {
    matches!(id, ACCEL | RPS | ENCODER | CONTROL)
}

/// Exact payload size for fixed-layout identifiers.
pub fn payload_size(id: u8) -> Option<usize> {
    match id {
        ACCEL => Some(12),
        RPS | ENCODER => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(identifier_name(ACCEL), "ACCEL");
        assert_eq!(identifier_name(CONTROL), "CONTROL");
        assert_eq!(identifier_name(0x00), "UNKNOWN");
    }

    #[test]
    fn fixed_layouts() {
        assert_eq!(payload_size(ACCEL), Some(12));
        assert_eq!(payload_size(RPS), Some(2));
        assert_eq!(payload_size(ENCODER), Some(2));
        assert_eq!(payload_size(CONTROL), None);
        assert!(is_known(ENCODER));
        assert!(!is_known(0x7F));
    }
}
