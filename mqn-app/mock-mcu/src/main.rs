mod sim;

use core::cell::RefCell;

use clap::Parser;
use embassy_executor::{Executor, Spawner};
use mqn_core::mk_static;
use mqn_core::utils::controllers::{
    Dir, I2C_CHANNEL, I2CCommand, LED_CHANNEL, LEDCommand, LedModule, Motor, MotionKit,
    SystemCommand, SystemController,
};
use mqn_core::utils::decode::LineCondition;
use mqn_core::utils::events::{EventPoller, IrTrigger, PollerConfig};
use mqn_core::utils::{Delay, Duration, Timer};
use sim::SimBoard;
use static_cell::StaticCell;
use tracing::{error, info, warn};

type Bus = SimBoard;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// I2C address of the expansion board
    #[clap(long, default_value_t = 0x10)]
    address: u8,
    /// pause between two sensor polls, in milliseconds
    #[clap(long, default_value_t = 100)]
    period_ms: u64,
    /// fire the IR callback once per press instead of every poll
    #[clap(long)]
    ir_edge: bool,
    /// stop polling after this many periods instead of waiting for the power key
    #[clap(long)]
    ticks: Option<u64>,
}

/// Commands sent once at start-up, as a remote client would.
const STARTUP_COMMANDS: [&str; 4] = [
    r#"{"ct":"i","ic":"read_ultrasonic"}"#,
    r#"{"ct":"l","lc":"sc","r":0,"g":64,"b":255}"#,
    r#"{"ct":"l","lc":"on"}"#,
    r#"{"ct":"l","lc":"headlight","led":"right","switch":"off"}"#,
];

#[embassy_executor::task]
async fn i2c_task(mut ctrl: SystemController<Bus>) -> ! {
    ctrl.i2c_ch().await
}

#[embassy_executor::task]
async fn led_task(mut leds: LedModule<'static, Bus>) -> ! {
    loop {
        let cmd: LEDCommand = LED_CHANNEL.receiver().receive().await;
        if let Err(e) = leds.ex_command(cmd) {
            error!("LED command failed: {:?}", e);
        }
    }
}

#[embassy_executor::task]
async fn poll_task(
    poller: &'static EventPoller,
    mut board: MotionKit<'static, Bus>,
) {
    let ticks = poller.run(&mut board, &mut Delay).await;
    info!("Poller finished after {} ticks, stopping motors", ticks);
    if let Err(e) = board.motor_stop(Motor::All) {
        error!("Failed to stop motors: {}", e);
    }
    std::process::exit(0);
}

#[embassy_executor::task]
async fn deadline_task(
    poller: &'static EventPoller,
    after: Duration,
) {
    Timer::after(after).await;
    info!("Tick budget used up, stopping poller");
    poller.stop();
}

/// Steer away from the line: stop the motor on the side that saw it.
fn steer(motor: Motor) {
    let cmd = I2CCommand::MotorStop { motor };
    if I2C_CHANNEL.try_send(cmd).is_err() {
        warn!("I2C channel full, dropping steering command");
    }
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();

    let i2c_bus: &'static RefCell<Bus> =
        mk_static!(RefCell<Bus>, RefCell::new(SimBoard::new(opts.address)));

    let sys_ctrl = SystemController::new(i2c_bus, Some(opts.address));
    spawner.spawn(i2c_task(sys_ctrl)).unwrap();

    let leds = LedModule::new(MotionKit::new_with_addr(i2c_bus, opts.address));
    spawner.spawn(led_task(leds)).unwrap();

    let config = PollerConfig {
        period: Duration::from_millis(opts.period_ms),
        ir_trigger: if opts.ir_edge {
            IrTrigger::Edge
        } else {
            IrTrigger::Level
        },
    };
    // Callbacks are not Send, so the poller is leaked rather than put in a StaticCell.
    let poller: &'static EventPoller = Box::leak(Box::new(EventPoller::new(config)));

    poller.subscribe_ir(move |key| {
        info!("IR key {}", key);
        if key == 0 {
            info!("Power key pressed, stopping poller");
            poller.stop();
        }
    });
    poller.subscribe_line(LineCondition::LeftDark, || {
        info!("Left sensor hit the line");
        steer(Motor::M1);
    });

    spawner
        .spawn(poll_task(poller, MotionKit::new_with_addr(i2c_bus, opts.address)))
        .unwrap();

    if let Some(ticks) = opts.ticks {
        let after = Duration::from_millis(opts.period_ms.saturating_mul(ticks));
        spawner.spawn(deadline_task(poller, after)).unwrap();
    }

    for raw in STARTUP_COMMANDS {
        match serde_json::from_str::<SystemCommand>(raw) {
            Ok(cmd) => cmd.forward().await,
            Err(error) => error!(?error, "error deserializing SystemCommand"),
        }
    }

    let cruise = I2CCommand::MotorRun {
        motor: Motor::All,
        dir: Dir::Cw,
        speed: 120,
    };
    I2C_CHANNEL.send(cruise).await;
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
