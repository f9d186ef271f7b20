//! Module Exports
//!
//! This file exports the modules that talk to the expansion board.
//!
//! - `registers`: register address map of the board.
//! - `i2c`: register protocol, actuator commands and one-shot sensor reads.
//! - `leds`: RGB color packing and the LED command handler.

/// Module for the board's register map.
pub mod registers;
/// Module for managing the I2C-connected expansion board.
pub mod i2c;
pub mod leds;

use core::cell::RefCell;
use serde::{Deserialize, Serialize};

use crate::utils::decode::Version;

pub use i2c::{
    DeviceError, Dir, I2CCommand, Led, LedSwitch, Motor, MotionKit, Reading, Servo, I2C_CHANNEL,
};
pub use leds::{rgb, unpack_rgb, LEDCommand, LedModule, LED_CHANNEL};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "ct", rename_all = "snake_case")] // ct = command type
pub enum SystemCommand {
    I(i2c::I2CCommand),
    L(leds::LEDCommand),
}

impl SystemCommand {
    /// Hand the command to the channel of the task that executes it.
    pub async fn forward(self) {
        match self {
            SystemCommand::I(cmd) => I2C_CHANNEL.send(cmd).await,
            SystemCommand::L(cmd) => LED_CHANNEL.send(cmd).await,
        }
    }
}

pub struct SystemController<I2C: 'static> {
    pub board: i2c::MotionKit<'static, I2C>,
    version: Option<Version>,
}

impl<I2C, E> SystemController<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    /// Attach to the board and log its firmware version.
    ///
    /// A board that does not answer is only logged; commands are still
    /// attempted later since the board may come up after the host.
    #[allow(deprecated)]
    pub fn new(i2c_bus: &'static RefCell<I2C>, address: Option<u8>) -> Self {
        let addr = address.unwrap_or(registers::DEFAULT_ADDRESS);
        let mut board = i2c::MotionKit::new_with_addr(i2c_bus, addr);

        let version = match board.read_version() {
            Ok(v) => {
                tracing::info!("Maqueen board at 0x{:02X}, firmware {:?}", addr, v.as_str());
                Some(v)
            }
            Err(e) => {
                tracing::warn!("Maqueen board at 0x{:02X} not responding: {:?}", addr, e);
                None
            }
        };

        SystemController { board, version }
    }

    /// Firmware version read at start-up, if the board answered.
    pub fn version(&self) -> Option<&str> {
        self.version.as_ref().map(|v| v.as_str())
    }

    pub async fn i2c_ch(&mut self) -> ! {
        loop {
            let i2c_channel = I2C_CHANNEL.receiver().receive().await;
            tracing::info!("Received I2C Command: {:?}", i2c_channel);
            match self.board.execute_command(i2c_channel) {
                Ok(Some(reading)) => tracing::info!(?reading, "Sensor Read"),
                Ok(None) => tracing::info!("I2C command executed successfully"),
                Err(e) => tracing::error!("I2C command failed: {}", e),
            }
        }
    }
}
