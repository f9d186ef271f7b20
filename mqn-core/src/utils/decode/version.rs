//! Firmware version string.
//!
//! The board exposes its version as a length byte followed by that many
//! ASCII characters. Kept for compatibility with older firmware tooling.

/// Longest version the length register can announce.
pub const VERSION_MAX_LEN: usize = u8::MAX as usize;

pub type Version = heapless::String<VERSION_MAX_LEN>;

/// Decode the version bytes one character per byte.
///
/// Bytes outside the ASCII range are replaced with `?`.
pub fn decode_version(bytes: &[u8]) -> Version {
    let mut version = Version::new();
    for &b in bytes.iter().take(VERSION_MAX_LEN) {
        let c = if b.is_ascii() { char::from(b) } else { '?' };
        // Capacity matches the `take` above, so this never overflows.
        let _ = version.push(c);
    }
    version
}
