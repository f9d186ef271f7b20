//! Sensor event dispatch.
//!
//! - `poller`: recurring task that samples the IR and line registers and
//!   invokes the subscribed callbacks.

pub mod poller;

pub use poller::{EventPoller, IrTrigger, PollerConfig, DEFAULT_PERIOD};
