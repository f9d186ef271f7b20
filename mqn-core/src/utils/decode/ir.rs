//! Infrared remote decoding.
//!
//! The receiver latches the last NEC frame into a 4-byte register. The frame
//! is reassembled with the first received byte as the most significant one
//! and then looked up in the remote's key table. All known codes carry the
//! vendor prefix `0xFD` in bits 16..24.

/// Returned when the register holds no code (no key pressed).
pub const IR_NO_KEY: i16 = -1;

/// Known remote codes and the key number each one produces.
///
/// The numbering is sparse: 3, 7, 11, 15, 19 and 23 never occur.
const KEY_TABLE: [(u32, u8); 21] = [
    (0xFD00FF, 0),
    (0xFD807F, 1),
    (0xFD40BF, 2),
    (0xFD20DF, 4),
    (0xFDA05F, 5),
    (0xFD609F, 6),
    (0xFD10EF, 8),
    (0xFD906F, 9),
    (0xFD50AF, 10),
    (0xFD30CF, 12),
    (0xFDB04F, 13),
    (0xFD708F, 14),
    (0xFD08F7, 16),
    (0xFD8877, 17),
    (0xFD48B7, 18),
    (0xFD28D7, 20),
    (0xFDA857, 21),
    (0xFD6897, 22),
    (0xFD18E7, 24),
    (0xFD9867, 25),
    (0xFD58A7, 26),
];

/// A key of the bundled remote, identified by its table number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrKey(u8);

impl IrKey {
    /// Look a raw code up in the key table.
    pub fn from_code(code: u32) -> Option<Self> {
        KEY_TABLE
            .iter()
            .find(|&&(known, _)| known == code)
            .map(|&(_, key)| IrKey(key))
    }

    /// Table number of the key (0..=26).
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Reassemble the IR register bytes into a 32-bit code.
///
/// `buf[0]` is the most significant byte and `buf[3]` the least.
pub fn assemble_ir_code(buf: [u8; 4]) -> u32 {
    u32::from(buf[3])
        | u32::from(buf[2]) << 8
        | u32::from(buf[1]) << 16
        | u32::from(buf[0]) << 24
}

/// Convert a raw IR code to the key value handed to applications.
///
/// - `0` → [`IR_NO_KEY`]
/// - a code from the key table → its key number
/// - anything else → the low byte of the code
pub fn ir_key_value(code: u32) -> i16 {
    if code == 0 {
        return IR_NO_KEY;
    }
    match IrKey::from_code(code) {
        Some(key) => i16::from(key.value()),
        None => (code & 0xFF) as i16,
    }
}
