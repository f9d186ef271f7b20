use core::cell::RefCell;

use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};
use mqn_core::utils::controllers::{
    registers as reg, rgb, Dir, I2CCommand, LEDCommand, Led, LedModule, LedSwitch, Motor,
    MotionKit, Reading, Servo, SystemCommand,
};
use mqn_core::utils::decode::{Side, Surface};
use smart_leds_trait::{SmartLedsWrite, RGB8};

/// Default I2C address for the Maqueen expansion board.
pub const BOARD_ADDRESS: u8 = 0x10;

/// Create a write transaction for the given I2C address and data payload.
pub fn write(
    addr: u8,
    data: Vec<u8>,
) -> I2cTrans {
    I2cTrans::write(addr, data)
}
/// Create a read transaction for the given I2C address and expected data.
pub fn read(
    addr: u8,
    data: Vec<u8>,
) -> I2cTrans {
    I2cTrans::read(addr, data)
}
/// Register read as the board expects it: address write, then data read.
pub fn read_register(
    register: u8,
    data: Vec<u8>,
) -> [I2cTrans; 2] {
    [write(BOARD_ADDRESS, vec![register]), read(BOARD_ADDRESS, data)]
}

#[test]
fn test_servo_run_targets() {
    let expectations = [
        write(BOARD_ADDRESS, vec![0x14, 90]),
        write(BOARD_ADDRESS, vec![0x15, 45]),
        write(BOARD_ADDRESS, vec![0x14, 180]),
        write(BOARD_ADDRESS, vec![0x15, 180]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    kit.servo_run(Servo::S1, 90).unwrap();
    kit.servo_run(Servo::S2, 45).unwrap();
    kit.servo_run(Servo::All, 180).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_motor_run_and_stop() {
    let expectations = [
        write(BOARD_ADDRESS, vec![0x00, 0, 200]),
        write(BOARD_ADDRESS, vec![0x02, 1, 50]),
        write(BOARD_ADDRESS, vec![0x00, 1, 255]),
        write(BOARD_ADDRESS, vec![0x02, 1, 255]),
        write(BOARD_ADDRESS, vec![0x00, 0, 0]),
        write(BOARD_ADDRESS, vec![0x02, 0, 0]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    kit.motor_run(Motor::M1, Dir::Cw, 200).unwrap();
    kit.motor_run(Motor::M2, Dir::Ccw, 50).unwrap();
    kit.motor_run(Motor::All, Dir::Ccw, 255).unwrap();
    kit.motor_stop(Motor::All).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_actuators_are_repeatable() {
    // Same inputs, same bytes on the wire.
    let expectations = [
        write(BOARD_ADDRESS, vec![0x02, 0, 120]),
        write(BOARD_ADDRESS, vec![0x02, 0, 120]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    kit.motor_run(Motor::M2, Dir::Cw, 120).unwrap();
    kit.motor_run(Motor::M2, Dir::Cw, 120).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_headlights() {
    let expectations = [
        write(BOARD_ADDRESS, vec![0x0B, 1]),
        write(BOARD_ADDRESS, vec![0x0C, 0]),
        write(BOARD_ADDRESS, vec![0x0B, 1]),
        write(BOARD_ADDRESS, vec![0x0C, 1]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    kit.write_led(Led::Left, LedSwitch::On).unwrap();
    kit.write_led(Led::Right, LedSwitch::Off).unwrap();
    kit.write_led(Led::All, LedSwitch::On).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_set_color_splits_components() {
    let color = rgb(0x12, 0xAB, 0xFF);
    let expectations = [
        write(BOARD_ADDRESS, vec![reg::RGB_RED, 0x12]),
        write(BOARD_ADDRESS, vec![reg::RGB_GREEN, 0xAB]),
        write(BOARD_ADDRESS, vec![reg::RGB_BLUE, 0xFF]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    kit.set_color(color).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_ultrasonic_bands() {
    let expectations: Vec<I2cTrans> = [
        vec![0x00, 0x00],
        vec![0x00, 0x01],
        vec![0x01, 0x8F],
        vec![0x01, 0x90],
        vec![0xFF, 0xFF],
    ]
    .into_iter()
    .flat_map(|data| read_register(0x28, data))
    .collect();

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    let distances: Vec<i16> = (0..5).map(|_| kit.ultrasonic().unwrap()).collect();
    assert_eq!(distances, vec![-1, 1, 399, 400, 400]);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_read_patrol_sides() {
    let expectations: Vec<I2cTrans> = [0b00, 0b01, 0b10, 0b11]
        .into_iter()
        .flat_map(|raw| read_register(0x1D, vec![raw]))
        .collect();

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    let sides: Vec<(Surface, Surface)> = (0..4)
        .map(|_| {
            let reading = kit.read_patrol().unwrap();
            (reading.surface(Side::Left), reading.surface(Side::Right))
        })
        .collect();
    assert_eq!(
        sides,
        vec![
            (Surface::Bright, Surface::Bright),
            (Surface::Dark, Surface::Bright),
            (Surface::Bright, Surface::Dark),
            (Surface::Dark, Surface::Dark),
        ]
    );
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_ir_read_byte_order_and_table() {
    let expectations: Vec<I2cTrans> = [
        vec![0x00, 0xFD, 0x88, 0x77],
        vec![0x00, 0x00, 0x00, 0x00],
        vec![0x00, 0x12, 0x34, 0x56],
    ]
    .into_iter()
    .flat_map(|data| read_register(0x2B, data))
    .collect();

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    assert_eq!(kit.ir_read().unwrap(), 17);
    assert_eq!(kit.ir_read().unwrap(), -1);
    assert_eq!(kit.ir_read().unwrap(), 0x56);
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_repeated_reads_are_identical() {
    let expectations: Vec<I2cTrans> = (0..2)
        .flat_map(|_| read_register(0x2B, vec![0x00, 0xFD, 0x00, 0xFF]))
        .collect();

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    let first = kit.ir_read().unwrap();
    let second = kit.ir_read().unwrap();
    assert_eq!(first, 0);
    assert_eq!(first, second);
    i2c_bus.borrow_mut().done();
}

#[test]
#[allow(deprecated)]
fn test_read_version() {
    let mut expectations = Vec::new();
    expectations.extend(read_register(0x32, vec![4]));
    expectations.extend(read_register(0x33, b"V2.1".to_vec()));

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    assert_eq!(kit.read_version().unwrap().as_str(), "V2.1");
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_execute_command_returns_readings() {
    let mut expectations = vec![write(BOARD_ADDRESS, vec![0x0C, 1])];
    expectations.extend(read_register(0x28, vec![0x00, 0x2A]));
    expectations.extend(read_register(0x1D, vec![0b10]));

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    let led = I2CCommand::WriteLed {
        led: Led::Right,
        switch: LedSwitch::On,
    };
    assert_eq!(kit.execute_command(led).unwrap(), None);
    assert_eq!(
        kit.execute_command(I2CCommand::ReadUltrasonic).unwrap(),
        Some(Reading::Distance(42))
    );
    match kit.execute_command(I2CCommand::ReadPatrol).unwrap() {
        Some(Reading::Patrol(reading)) => assert!(reading.is(Side::Right, Surface::Dark)),
        other => panic!("unexpected reading: {:?}", other),
    }
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_smart_leds_write_uses_last_color() {
    let expectations = [
        write(BOARD_ADDRESS, vec![0x18, 7]),
        write(BOARD_ADDRESS, vec![0x19, 8]),
        write(BOARD_ADDRESS, vec![0x1A, 9]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut kit = MotionKit::new(&i2c_bus);
    kit.write([RGB8 { r: 1, g: 2, b: 3 }, RGB8 { r: 7, g: 8, b: 9 }])
        .unwrap();
    kit.write(core::iter::empty::<RGB8>()).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_led_module_switches_headlights_with_rgb() {
    let expectations = [
        // SC while off: nothing written. On: headlights, then last color.
        write(BOARD_ADDRESS, vec![0x0B, 1]),
        write(BOARD_ADDRESS, vec![0x0C, 1]),
        write(BOARD_ADDRESS, vec![0x18, 10]),
        write(BOARD_ADDRESS, vec![0x19, 20]),
        write(BOARD_ADDRESS, vec![0x1A, 30]),
        // SC while on: applied right away.
        write(BOARD_ADDRESS, vec![0x18, 1]),
        write(BOARD_ADDRESS, vec![0x19, 2]),
        write(BOARD_ADDRESS, vec![0x1A, 3]),
        // Off: black, then headlights.
        write(BOARD_ADDRESS, vec![0x18, 0]),
        write(BOARD_ADDRESS, vec![0x19, 0]),
        write(BOARD_ADDRESS, vec![0x1A, 0]),
        write(BOARD_ADDRESS, vec![0x0B, 0]),
        write(BOARD_ADDRESS, vec![0x0C, 0]),
        // On again: the color survives the off/on cycle.
        write(BOARD_ADDRESS, vec![0x0B, 1]),
        write(BOARD_ADDRESS, vec![0x0C, 1]),
        write(BOARD_ADDRESS, vec![0x18, 1]),
        write(BOARD_ADDRESS, vec![0x19, 2]),
        write(BOARD_ADDRESS, vec![0x1A, 3]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut leds = LedModule::new(MotionKit::new(&i2c_bus));
    leds.ex_command(LEDCommand::SC { r: 10, g: 20, b: 30 }).unwrap();
    leds.ex_command(LEDCommand::On).unwrap();
    assert!(leds.is_on());
    leds.ex_command(LEDCommand::SC { r: 1, g: 2, b: 3 }).unwrap();
    leds.ex_command(LEDCommand::Off).unwrap();
    assert!(!leds.is_on());
    leds.ex_command(LEDCommand::On).unwrap();
    assert_eq!(leds.last_color(), Some(RGB8 { r: 1, g: 2, b: 3 }));
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_led_module_on_defaults_to_white_and_headlight_is_independent() {
    let expectations = [
        write(BOARD_ADDRESS, vec![0x0B, 1]),
        write(BOARD_ADDRESS, vec![0x0C, 1]),
        write(BOARD_ADDRESS, vec![0x18, 255]),
        write(BOARD_ADDRESS, vec![0x19, 255]),
        write(BOARD_ADDRESS, vec![0x1A, 255]),
        write(BOARD_ADDRESS, vec![0x0C, 0]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut leds = LedModule::new(MotionKit::new(&i2c_bus));
    leds.ex_command(LEDCommand::On).unwrap();
    leds.ex_command(LEDCommand::Headlight {
        led: Led::Right,
        switch: LedSwitch::Off,
    })
    .unwrap();
    assert!(leds.is_on());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_led_module_keeps_state_on_bus_error() {
    let expectations = [write(BOARD_ADDRESS, vec![0x0B, 1]).with_error(ErrorKind::Other)];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut leds = LedModule::new(MotionKit::new(&i2c_bus));
    assert!(leds.ex_command(LEDCommand::On).is_err());
    assert!(!leds.is_on());
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_system_command_json() {
    let cmd: SystemCommand =
        serde_json::from_str(r#"{"ct":"i","ic":"motor_run","motor":"m1","dir":"cw","speed":200}"#)
            .unwrap();
    assert_eq!(
        cmd,
        SystemCommand::I(I2CCommand::MotorRun {
            motor: Motor::M1,
            dir: Dir::Cw,
            speed: 200,
        })
    );

    let cmd: SystemCommand = serde_json::from_str(r#"{"ct":"i","ic":"read_ir"}"#).unwrap();
    assert_eq!(cmd, SystemCommand::I(I2CCommand::ReadIr));

    let cmd: SystemCommand =
        serde_json::from_str(r#"{"ct":"l","lc":"sc","r":1,"g":2,"b":3}"#).unwrap();
    assert_eq!(cmd, SystemCommand::L(LEDCommand::SC { r: 1, g: 2, b: 3 }));

    let cmd: SystemCommand =
        serde_json::from_str(r#"{"ct":"l","lc":"headlight","led":"left","switch":"off"}"#)
            .unwrap();
    assert_eq!(
        cmd,
        SystemCommand::L(LEDCommand::Headlight {
            led: Led::Left,
            switch: LedSwitch::Off,
        })
    );

    assert!(serde_json::from_str::<SystemCommand>(r#"{"ct":"i","ic":"fly"}"#).is_err());
}
