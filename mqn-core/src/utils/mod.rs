//! Utility re-exports and helper macros for the Maqueen board.
//!
//! - `controllers`: register protocol, actuator commands and command dispatch
//! - `decode`: pure decoders for the sensor registers
//! - `events`: polling task turning sensor changes into callbacks
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod controllers;
pub mod decode;
pub mod events;

pub use controllers::{MotionKit, SystemController};
pub use embassy_time::*;
pub use events::{EventPoller, PollerConfig};

#[doc(hidden)]
pub use static_cell;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: $crate::utils::static_cell::StaticCell<$t> =
            $crate::utils::static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
