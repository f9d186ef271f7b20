//! Pure decoders for the sensor registers.
//!
//! Nothing here touches the bus. The controllers read raw bytes and hand them
//! to these functions, so every rule about ranges, byte order and lookup
//! tables can be tested in isolation.
//!
//! - `sonar`: ultrasonic distance banding
//! - `ir`: infrared remote code assembly and key lookup
//! - `patrol`: line-tracking bit extraction
//! - `version`: firmware version string

pub mod ir;
pub mod patrol;
pub mod sonar;
pub mod version;

pub use ir::{assemble_ir_code, ir_key_value, IrKey, IR_NO_KEY};
pub use patrol::{LineCondition, PatrolReading, Side, Surface};
pub use sonar::{decode_distance, DISTANCE_FAR, DISTANCE_NO_ECHO};
pub use version::{decode_version, Version, VERSION_MAX_LEN};
