//! Register map of the Maqueen expansion board.
//!
//! Every register is a single-byte address. Writes carry the address as their
//! first byte followed by the payload; reads write the address alone and then
//! read back the register width.

/// Default 7-bit I2C address of the expansion board.
pub const DEFAULT_ADDRESS: u8 = 0x10;

// ---------------------------------------------------------------------------
// Actuators (write)
// ---------------------------------------------------------------------------

/// Left motor: payload `[direction, speed]`.
pub const MOTOR_LEFT: u8 = 0x00;
/// Right motor: payload `[direction, speed]`.
pub const MOTOR_RIGHT: u8 = 0x02;

/// Left headlight LED: payload `[on_off]`.
pub const LED_LEFT: u8 = 0x0B;
/// Right headlight LED: payload `[on_off]`.
pub const LED_RIGHT: u8 = 0x0C;

/// Servo port S1: payload `[angle]`.
pub const SERVO_1: u8 = 0x14;
/// Servo port S2: payload `[angle]`.
pub const SERVO_2: u8 = 0x15;

/// RGB bank red component.
pub const RGB_RED: u8 = 0x18;
/// RGB bank green component.
pub const RGB_GREEN: u8 = 0x19;
/// RGB bank blue component.
pub const RGB_BLUE: u8 = 0x1A;

// ---------------------------------------------------------------------------
// Sensors (read)
// ---------------------------------------------------------------------------

/// Line-tracking state, 1 byte. Bit 0 = left, bit 1 = right.
pub const PATROL: u8 = 0x1D;
pub const PATROL_LEN: usize = 1;

/// Ultrasonic range, 2 bytes big-endian.
pub const ULTRASONIC: u8 = 0x28;
pub const ULTRASONIC_LEN: usize = 2;

/// Last received infrared code, 4 bytes.
pub const IR_CODE: u8 = 0x2B;
pub const IR_CODE_LEN: usize = 4;

/// Length of the firmware version string, 1 byte.
pub const VERSION_LEN: u8 = 0x32;
/// Firmware version string, `VERSION_LEN` bytes of ASCII.
pub const VERSION_DATA: u8 = 0x33;
