//! RGB LED control for the Maqueen board.
//!
//! The board has one RGB register bank shared by all of its RGB LEDs.
//! [`MotionKit`] implements `SmartLedsWrite` on top of that bank, and
//! [`LedModule`] drives the bank together with the headlights for commands
//! received over `LED_CHANNEL`.

use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::i2c::I2c;
use serde::{Deserialize, Serialize};
use smart_leds_trait::{SmartLedsWrite, RGB8};

use super::i2c::{DeviceError, Led, LedSwitch, MotionKit};

/// Channel used to receive LED commands (`LEDCommand` messages).
pub static LED_CHANNEL: embassy_sync::channel::Channel<CriticalSectionRawMutex, LEDCommand, 16> =
    embassy_sync::channel::Channel::new();

/// Pack three components into `0xRRGGBB`.
pub fn rgb(
    red: u8,
    green: u8,
    blue: u8,
) -> u32 {
    u32::from(red) << 16 | u32::from(green) << 8 | u32::from(blue)
}

/// Split a packed `0xRRGGBB` color. Bits above 24 are ignored.
pub fn unpack_rgb(color: u32) -> RGB8 {
    RGB8 {
        r: (color >> 16) as u8,
        g: (color >> 8) as u8,
        b: color as u8,
    }
}

/// The RGB bank holds a single color, so only the last item is written.
impl<I2C, E> SmartLedsWrite for MotionKit<'_, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: fmt::Debug,
{
    type Error = DeviceError<E>;
    type Color = RGB8;

    fn write<T, I>(
        &mut self,
        iterator: T,
    ) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        match iterator.into_iter().last() {
            Some(color) => {
                let c: RGB8 = color.into();
                self.set_color(rgb(c.r, c.g, c.b))
            }
            None => Ok(()),
        }
    }
}

/// LED command variants for the board's lights.
///
/// Serialized as JSON with tag `"lc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "lc", rename_all = "snake_case")]
pub enum LEDCommand {
    /// Headlights on, RGB bank to the last color (white if none was set).
    On,
    /// RGB bank black, headlights off.
    Off,
    /// Set the RGB color, shown right away if the lights are on.
    #[serde(rename = "sc")]
    SC { r: u8, g: u8, b: u8 },
    /// Switch headlights individually; the RGB bank is left alone.
    Headlight { led: Led, switch: LedSwitch },
}

const WHITE: RGB8 = RGB8 {
    r: 255,
    g: 255,
    b: 255,
};
const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Lighting controller for the Maqueen board.
///
/// Treats the two headlight switches (`0x0B`/`0x0C`) and the RGB bank as one
/// set of lights: `On`/`Off` drive both, while the selected color is kept
/// across an off/on cycle.
pub struct LedModule<'a, I2C: 'static> {
    board: MotionKit<'a, I2C>,
    is_on: bool,
    last_color: Option<RGB8>,
}

impl<'a, I2C, E> LedModule<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: fmt::Debug,
{
    /// The lights start off with no remembered color. Nothing is written.
    pub fn new(board: MotionKit<'a, I2C>) -> Self {
        Self {
            board,
            is_on: false,
            last_color: None,
        }
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn last_color(&self) -> Option<RGB8> {
        self.last_color
    }

    /// Execute an incoming `LEDCommand`.
    ///
    /// State is only updated once every write of the command went through.
    pub fn ex_command(
        &mut self,
        cmd: LEDCommand,
    ) -> Result<(), DeviceError<E>> {
        match cmd {
            LEDCommand::On => {
                self.board.write_led(Led::All, LedSwitch::On)?;
                self.board.write([self.last_color.unwrap_or(WHITE)])?;
                self.is_on = true;
            }
            LEDCommand::Off => {
                self.board.write([BLACK])?;
                self.board.write_led(Led::All, LedSwitch::Off)?;
                self.is_on = false;
            }
            LEDCommand::SC { r, g, b } => {
                let new_color = RGB8 { r, g, b };
                if self.is_on {
                    self.board.write([new_color])?;
                }
                self.last_color = Some(new_color);
            }
            LEDCommand::Headlight { led, switch } => {
                self.board.write_led(led, switch)?;
            }
        }
        Ok(())
    }
}
