//! Checksum primitives.
//!
//! The binary protocol treats its 16-bit checksum as a plug-in:
//! [`FrameConfig::checksum`](crate::FrameConfig) takes any [`ChecksumFn`].

/// A deterministic, side-effect free 16-bit checksum over a byte slice.
pub type ChecksumFn = fn(&[u8]) -> u16;

/// CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no reflection, no final xor.
pub fn crc16_ccitt_false(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &b in bytes {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Running exclusive-or of the Unicode code points in `text`.
///
/// Used by the legacy line protocol. ASCII data always yields a value below
/// 128; wider characters contribute their full code point.
pub fn xor_code_points(text: &str) -> u32 {
    text.chars().fold(0u32, |acc, c| acc ^ c as u32)
}
