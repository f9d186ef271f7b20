//! Event poller for the infrared and line-tracking sensors.
//!
//! [`EventPoller`] owns one subscription record per sensor class. Every tick
//! it reads the registers of the enabled sensors through a [`MotionKit`],
//! decides whether the subscribed condition was observed, and invokes the
//! callback. Between ticks it waits a fixed period on any async `DelayNs`.
//!
//! The poller is meant to live on the same executor as every other user of
//! the bus. Its methods take `&self`, so application code can subscribe while
//! the poll task is running; nothing here is `Sync`.

use alloc::boxed::Box;
use core::{
    cell::{Cell, RefCell},
    fmt,
};

use embassy_time::Duration;
use embedded_hal::i2c::I2c;
use embedded_hal_async::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::utils::{
    controllers::MotionKit,
    decode::{ir_key_value, LineCondition, Surface},
};

/// Pause between two ticks unless configured otherwise.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);

/// When the IR callback fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrTrigger {
    /// Every tick in which a code is present, i.e. repeatedly while a key is
    /// held.
    #[default]
    Level,
    /// Only when the code differs from the previous sample. A sample with no
    /// code re-arms the trigger.
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub period: Duration,
    pub ir_trigger: IrTrigger,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            ir_trigger: IrTrigger::Level,
        }
    }
}

/// Subscription record for one sensor class.
///
/// `armed` is `Some` exactly while the subscription is enabled and holds what
/// it waits for (`()` for IR, the [`LineCondition`] for line tracking).
/// `generation` changes on every (un)subscribe so a dispatch in flight can
/// tell whether its callback was replaced meanwhile.
struct Subscription<C: ?Sized, S, A = ()> {
    armed: Option<A>,
    callback: Option<Box<C>>,
    last_observed: Option<S>,
    generation: u32,
}

impl<C: ?Sized, S, A> Subscription<C, S, A> {
    fn empty() -> Self {
        Self {
            armed: None,
            callback: None,
            last_observed: None,
            generation: 0,
        }
    }

    fn enabled(&self) -> bool {
        self.armed.is_some()
    }

    fn install(
        &mut self,
        armed: A,
        callback: Box<C>,
    ) {
        self.armed = Some(armed);
        self.callback = Some(callback);
        self.last_observed = None;
        self.generation = self.generation.wrapping_add(1);
    }

    fn clear(&mut self) {
        self.armed = None;
        self.callback = None;
        self.last_observed = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Run `call` on the slot's callback without holding the borrow, so the
/// callback may (un)subscribe. The callback is put back only if the slot was
/// not changed during the call.
fn dispatch<C: ?Sized, S, A>(
    slot: &RefCell<Subscription<C, S, A>>,
    call: impl FnOnce(&mut C),
) {
    let (mut callback, generation) = {
        let mut sub = slot.borrow_mut();
        match sub.callback.take() {
            Some(cb) => (cb, sub.generation),
            None => return,
        }
    };

    call(&mut *callback);

    let mut sub = slot.borrow_mut();
    if sub.generation == generation {
        sub.callback = Some(callback);
    }
}

/// Polls the IR receiver and line sensors and dispatches callbacks.
pub struct EventPoller {
    config: PollerConfig,
    ir: RefCell<Subscription<dyn FnMut(i16), u32>>,
    line: RefCell<Subscription<dyn FnMut(), Surface, LineCondition>>,
    running: Cell<bool>,
}

impl Default for EventPoller {
    fn default() -> Self {
        Self::new(PollerConfig::default())
    }
}

impl EventPoller {
    /// Create a poller with both subscriptions empty.
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            ir: RefCell::new(Subscription::empty()),
            line: RefCell::new(Subscription::empty()),
            running: Cell::new(true),
        }
    }

    pub fn config(&self) -> PollerConfig {
        self.config
    }

    /// Call `callback` with the decoded key value whenever an IR code is
    /// observed (see [`IrTrigger`]). Replaces any previous IR callback.
    pub fn subscribe_ir(
        &self,
        callback: impl FnMut(i16) + 'static,
    ) {
        self.ir.borrow_mut().install((), Box::new(callback));
        tracing::debug!("IR subscription installed");
    }

    /// Call `callback` each time the armed sensor moves onto the armed
    /// surface. Replaces any previous line subscription and its condition.
    ///
    /// The first sample after subscribing only records the starting state.
    pub fn subscribe_line(
        &self,
        condition: LineCondition,
        callback: impl FnMut() + 'static,
    ) {
        self.line.borrow_mut().install(condition, Box::new(callback));
        tracing::debug!(?condition, "line subscription installed");
    }

    pub fn unsubscribe_ir(&self) {
        self.ir.borrow_mut().clear();
    }

    pub fn unsubscribe_line(&self) {
        self.line.borrow_mut().clear();
    }

    pub fn ir_enabled(&self) -> bool {
        self.ir.borrow().enabled()
    }

    /// Armed line condition, if a line subscription is installed.
    pub fn line_condition(&self) -> Option<LineCondition> {
        self.line.borrow().armed
    }

    /// Make [`run`](Self::run) return after the current tick.
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Sample the enabled sensors once and dispatch callbacks.
    ///
    /// A failed read is logged and that sensor is skipped for this tick; its
    /// previous observation is kept.
    pub fn poll_once<I2C, E>(
        &self,
        board: &mut MotionKit<'_, I2C>,
    ) where
        I2C: I2c<Error = E> + 'static,
        E: fmt::Debug,
    {
        self.poll_ir(board);
        self.poll_line(board);
    }

    /// Poll until [`stop`](Self::stop) is called, waiting the configured
    /// period after each tick. Returns the number of ticks performed.
    pub async fn run<I2C, E, D>(
        &self,
        board: &mut MotionKit<'_, I2C>,
        delay: &mut D,
    ) -> u64
    where
        I2C: I2c<Error = E> + 'static,
        E: fmt::Debug,
        D: DelayNs,
    {
        let period_us = u32::try_from(self.config.period.as_micros()).unwrap_or(u32::MAX);
        tracing::info!(period_us, "event poller started");

        let mut ticks = 0u64;
        while self.running.get() {
            self.poll_once(board);
            ticks += 1;
            if !self.running.get() {
                break;
            }
            delay.delay_us(period_us).await;
        }

        tracing::info!(ticks, "event poller stopped");
        ticks
    }

    fn poll_ir<I2C, E>(
        &self,
        board: &mut MotionKit<'_, I2C>,
    ) where
        I2C: I2c<Error = E> + 'static,
        E: fmt::Debug,
    {
        if !self.ir.borrow().enabled() {
            return;
        }

        let code = match board.read_ir_code() {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!("IR poll failed: {:?}", e);
                return;
            }
        };

        let fire = {
            let mut sub = self.ir.borrow_mut();
            let previous = sub.last_observed.replace(code);
            code != 0
                && match self.config.ir_trigger {
                    IrTrigger::Level => true,
                    IrTrigger::Edge => previous != Some(code),
                }
        };

        if fire {
            let key = ir_key_value(code);
            tracing::debug!(code, key, "IR event");
            dispatch(&self.ir, |cb| cb(key));
        }
    }

    fn poll_line<I2C, E>(
        &self,
        board: &mut MotionKit<'_, I2C>,
    ) where
        I2C: I2c<Error = E> + 'static,
        E: fmt::Debug,
    {
        let Some(condition) = self.line.borrow().armed else {
            return;
        };

        let reading = match board.read_patrol() {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!("line poll failed: {:?}", e);
                return;
            }
        };

        // Only the armed side is looked at.
        let surface = reading.surface(condition.side());
        let fire = {
            let mut sub = self.line.borrow_mut();
            let previous = sub.last_observed.replace(surface);
            surface == condition.surface() && previous.is_some_and(|p| p != surface)
        };

        if fire {
            tracing::debug!(?condition, "line event");
            dispatch(&self.line, |cb| cb());
        }
    }
}
