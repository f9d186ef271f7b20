//! Ultrasonic range decoding.
//!
//! The ranger reports a 16-bit big-endian reading. Only `1..=399` is trusted;
//! everything outside folds into one of two sentinels.

/// Returned when the ranger saw no echo (raw reading of 0).
pub const DISTANCE_NO_ECHO: i16 = -1;

/// Returned for any reading beyond the trusted range.
pub const DISTANCE_FAR: i16 = 400;

const MAX_TRUSTED: u16 = 399;

/// Combine the two ultrasonic register bytes (high byte first).
pub fn assemble_distance(buf: [u8; 2]) -> u16 {
    u16::from(buf[0]) << 8 | u16::from(buf[1])
}

/// Map a raw ultrasonic reading to a distance.
///
/// `0` becomes [`DISTANCE_NO_ECHO`], anything above 399 becomes
/// [`DISTANCE_FAR`], and `1..=399` is returned unchanged.
pub fn decode_distance(raw: u16) -> i16 {
    match raw {
        0 => DISTANCE_NO_ECHO,
        1..=MAX_TRUSTED => raw as i16,
        _ => DISTANCE_FAR,
    }
}
