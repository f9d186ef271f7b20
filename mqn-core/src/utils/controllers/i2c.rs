//! I2C register protocol and actuator commands for the Maqueen board.
//!
//! [`MotionKit`] owns a per-transaction handle onto a shared I2C bus and
//! exposes the board's registers as motor, servo, LED and sensor operations.
//! Commands are received via `I2C_CHANNEL`.

use core::{cell::RefCell, fmt};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use serde::{Deserialize, Serialize};

use super::registers as reg;
use crate::utils::decode::{self, PatrolReading, Version};

/// Channel used to receive I2C commands (`I2CCommand` messages).
pub static I2C_CHANNEL: embassy_sync::channel::Channel<CriticalSectionRawMutex, I2CCommand, 16> =
    embassy_sync::channel::Channel::new();

/// Errors that can occur when talking to the expansion board.
#[derive(Debug, PartialEq)]
pub enum DeviceError<E: fmt::Debug> {
    /// The underlying bus transaction failed.
    Bus(E),
    /// `write_register` was called without a register address.
    EmptyWrite,
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Bus(e) => write!(f, "I2C error: {:?}", e),
            DeviceError::EmptyWrite => write!(f, "register write without an address byte"),
        }
    }
}

/// Servo port selector.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Servo {
    S1,
    S2,
    All,
}

/// Motor selector.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Motor {
    /// Left motor.
    M1,
    /// Right motor.
    M2,
    All,
}

/// Motor rotation direction, written as-is into the motor register.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Dir {
    /// Forward.
    Cw = 0,
    /// Backward.
    Ccw = 1,
}

/// Headlight LED selector.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Led {
    Left,
    Right,
    All,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LedSwitch {
    Off = 0,
    On = 1,
}

impl Servo {
    fn registers(self) -> &'static [u8] {
        match self {
            Servo::S1 => &[reg::SERVO_1],
            Servo::S2 => &[reg::SERVO_2],
            Servo::All => &[reg::SERVO_1, reg::SERVO_2],
        }
    }
}

impl Motor {
    fn registers(self) -> &'static [u8] {
        match self {
            Motor::M1 => &[reg::MOTOR_LEFT],
            Motor::M2 => &[reg::MOTOR_RIGHT],
            Motor::All => &[reg::MOTOR_LEFT, reg::MOTOR_RIGHT],
        }
    }
}

impl Led {
    fn registers(self) -> &'static [u8] {
        match self {
            Led::Left => &[reg::LED_LEFT],
            Led::Right => &[reg::LED_RIGHT],
            Led::All => &[reg::LED_LEFT, reg::LED_RIGHT],
        }
    }
}

/// I2C command variants for actuators and one-shot sensor reads.
///
/// Serialized as JSON with tag `"ic"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "ic", rename_all = "snake_case")]
pub enum I2CCommand {
    // Actuator Variants
    ServoRun { servo: Servo, angle: u8 },
    MotorRun { motor: Motor, dir: Dir, speed: u8 },
    MotorStop { motor: Motor },
    WriteLed { led: Led, switch: LedSwitch },
    /// Packed `0xRRGGBB` color for the RGB bank.
    SetColor { color: u32 },

    // Sensor Variants
    ReadUltrasonic,
    ReadPatrol,
    ReadIr,
    ReadVersion,
}

/// Decoded result of a sensor command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Distance(i16),
    Patrol(PatrolReading),
    IrKey(i16),
    Version(Version),
}

/// High-level driver for the expansion board over a shared I2C bus.
///
/// Each bus operation borrows the bus only for the duration of one
/// transaction, so several `MotionKit`s (e.g. one per task) can share the
/// same `RefCell` on a single executor.
pub struct MotionKit<'a, I2C: 'static> {
    i2c: RefCellDevice<'a, I2C>,
    address: u8,
}

impl<'a, I2C, E> MotionKit<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: fmt::Debug,
{
    /// Create a driver for a board at the default address (`0x10`).
    pub fn new(i2c_bus: &'a RefCell<I2C>) -> Self {
        Self::new_with_addr(i2c_bus, reg::DEFAULT_ADDRESS)
    }

    pub fn new_with_addr(
        i2c_bus: &'a RefCell<I2C>,
        address: u8,
    ) -> Self {
        MotionKit {
            i2c: RefCellDevice::new(i2c_bus),
            address,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    // -----------------------------------------------------------------------
    // Register protocol
    // -----------------------------------------------------------------------

    /// Write the register address, then read `buf.len()` bytes back.
    ///
    /// No retries are made. The write and the read are issued back-to-back
    /// with nothing in between that could yield to another task.
    pub fn read_register(
        &mut self,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), DeviceError<E>> {
        self.i2c
            .write(self.address, &[register])
            .map_err(DeviceError::Bus)?;
        self.i2c
            .read(self.address, buf)
            .map_err(DeviceError::Bus)?;
        Ok(())
    }

    /// Read a fixed-width register.
    pub fn read_bytes<const N: usize>(
        &mut self,
        register: u8,
    ) -> Result<[u8; N], DeviceError<E>> {
        let mut buf = [0u8; N];
        self.read_register(register, &mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(
        &mut self,
        register: u8,
    ) -> Result<u8, DeviceError<E>> {
        let [b] = self.read_bytes::<1>(register)?;
        Ok(b)
    }

    /// Write `bytes` as one transaction: `[register, payload...]`.
    pub fn write_register(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), DeviceError<E>> {
        if bytes.is_empty() {
            return Err(DeviceError::EmptyWrite);
        }
        self.i2c
            .write(self.address, bytes)
            .map_err(DeviceError::Bus)
    }

    // -----------------------------------------------------------------------
    // Actuators
    // -----------------------------------------------------------------------

    /// Set the angle of one or both servos. The angle byte is sent unchanged.
    pub fn servo_run(
        &mut self,
        servo: Servo,
        angle: u8,
    ) -> Result<(), DeviceError<E>> {
        for &register in servo.registers() {
            self.write_register(&[register, angle])?;
        }
        Ok(())
    }

    /// Drive one or both motors. With `Motor::All` the left motor is written
    /// first.
    pub fn motor_run(
        &mut self,
        motor: Motor,
        dir: Dir,
        speed: u8,
    ) -> Result<(), DeviceError<E>> {
        for &register in motor.registers() {
            self.write_register(&[register, dir as u8, speed])?;
        }
        Ok(())
    }

    pub fn motor_stop(
        &mut self,
        motor: Motor,
    ) -> Result<(), DeviceError<E>> {
        for &register in motor.registers() {
            self.write_register(&[register, 0, 0])?;
        }
        Ok(())
    }

    /// Switch one or both headlight LEDs.
    pub fn write_led(
        &mut self,
        led: Led,
        switch: LedSwitch,
    ) -> Result<(), DeviceError<E>> {
        for &register in led.registers() {
            self.write_register(&[register, switch as u8])?;
        }
        Ok(())
    }

    /// Write a packed `0xRRGGBB` color into the RGB bank, red first.
    pub fn set_color(
        &mut self,
        color: u32,
    ) -> Result<(), DeviceError<E>> {
        let rgb = super::leds::unpack_rgb(color);
        self.write_register(&[reg::RGB_RED, rgb.r])?;
        self.write_register(&[reg::RGB_GREEN, rgb.g])?;
        self.write_register(&[reg::RGB_BLUE, rgb.b])
    }

    // -----------------------------------------------------------------------
    // Sensors
    // -----------------------------------------------------------------------

    /// Distance from the ultrasonic ranger, with the `-1` / `400` sentinels.
    pub fn ultrasonic(&mut self) -> Result<i16, DeviceError<E>> {
        let buf = self.read_bytes::<{ reg::ULTRASONIC_LEN }>(reg::ULTRASONIC)?;
        Ok(decode::decode_distance(decode::sonar::assemble_distance(buf)))
    }

    pub fn read_patrol(&mut self) -> Result<PatrolReading, DeviceError<E>> {
        let [raw] = self.read_bytes::<{ reg::PATROL_LEN }>(reg::PATROL)?;
        Ok(PatrolReading::from_raw(raw))
    }

    /// Raw 32-bit code currently latched by the IR receiver (`0` = none).
    pub fn read_ir_code(&mut self) -> Result<u32, DeviceError<E>> {
        let buf = self.read_bytes::<{ reg::IR_CODE_LEN }>(reg::IR_CODE)?;
        Ok(decode::assemble_ir_code(buf))
    }

    /// Key value of the current IR code, see [`decode::ir_key_value`].
    pub fn ir_read(&mut self) -> Result<i16, DeviceError<E>> {
        Ok(decode::ir_key_value(self.read_ir_code()?))
    }

    /// Firmware version string.
    #[deprecated(note = "kept for older firmware tooling")]
    pub fn read_version(&mut self) -> Result<Version, DeviceError<E>> {
        let len = self.read_u8(reg::VERSION_LEN)? as usize;
        if len == 0 {
            return Ok(Version::new());
        }
        let mut buf = [0u8; decode::VERSION_MAX_LEN];
        self.read_register(reg::VERSION_DATA, &mut buf[..len])?;
        Ok(decode::decode_version(&buf[..len]))
    }

    /// Execute a high-level `I2CCommand`.
    ///
    /// Returns the decoded value for sensor commands or `None` for actuators.
    #[allow(deprecated)]
    pub fn execute_command(
        &mut self,
        command: I2CCommand,
    ) -> Result<Option<Reading>, DeviceError<E>> {
        match command {
            I2CCommand::ServoRun { servo, angle } => {
                self.servo_run(servo, angle)?;
                Ok(None)
            }
            I2CCommand::MotorRun { motor, dir, speed } => {
                self.motor_run(motor, dir, speed)?;
                Ok(None)
            }
            I2CCommand::MotorStop { motor } => {
                self.motor_stop(motor)?;
                Ok(None)
            }
            I2CCommand::WriteLed { led, switch } => {
                self.write_led(led, switch)?;
                Ok(None)
            }
            I2CCommand::SetColor { color } => {
                self.set_color(color)?;
                Ok(None)
            }
            I2CCommand::ReadUltrasonic => Ok(Some(Reading::Distance(self.ultrasonic()?))),
            I2CCommand::ReadPatrol => Ok(Some(Reading::Patrol(self.read_patrol()?))),
            I2CCommand::ReadIr => Ok(Some(Reading::IrKey(self.ir_read()?))),
            I2CCommand::ReadVersion => Ok(Some(Reading::Version(self.read_version()?))),
        }
    }
}
