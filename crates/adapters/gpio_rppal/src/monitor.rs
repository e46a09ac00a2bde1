//! rppal-backed [`LineMonitor`] and its per-line watch thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, InputPin, Trigger};

use pressgate_app::edge_sink::EdgeSink;
use pressgate_app::ports::{LineHandle, LineMonitor};
use pressgate_domain::error::{HardwareError, ReleaseError};
use pressgate_domain::line::{Line, LineId};

use crate::config::{Bias, GpioConfig};
use crate::error::GpioError;

/// How long one interrupt poll blocks before re-checking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Line monitor on the Raspberry Pi GPIO controller.
pub struct RppalLineMonitor {
    gpio: Gpio,
    config: GpioConfig,
}

impl RppalLineMonitor {
    /// Open the GPIO controller.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Unavailable`] when the controller cannot be
    /// accessed (not a Pi, missing `/dev/gpiomem`, permission denied).
    pub fn new(config: GpioConfig) -> Result<Self, HardwareError> {
        let gpio = Gpio::new().map_err(|err| HardwareError::Unavailable(Box::new(GpioError::from(err))))?;
        Ok(Self { gpio, config })
    }
}

impl LineMonitor for RppalLineMonitor {
    type Handle = RppalLineHandle;

    fn open(&self, line: &Line) -> Result<RppalLineHandle, HardwareError> {
        let id = line.id();
        let pin = self
            .gpio
            .get(id.pin())
            .map_err(|err| GpioError::from(err).into_claim(id))?;

        let mut input = match self.config.bias {
            Bias::PullUp => pin.into_input_pullup(),
            Bias::PullDown => pin.into_input_pulldown(),
            Bias::Off => pin.into_input(),
        };
        input
            .set_interrupt(Trigger::FallingEdge, debounce_setting(line.debounce()))
            .map_err(|err| GpioError::from(err).into_claim(id))?;

        tracing::debug!(line = %id, bias = ?self.config.bias, debounce = ?line.debounce(), "GPIO line claimed");
        Ok(RppalLineHandle {
            line: id,
            state: State::Claimed(input),
        })
    }
}

/// The driver treats a zero debounce as "no debounce".
fn debounce_setting(debounce: Duration) -> Option<Duration> {
    (!debounce.is_zero()).then_some(debounce)
}

enum State {
    /// Pin configured, no watch thread yet.
    Claimed(InputPin),
    /// Watch thread owns the pin and hands it back when it exits.
    Watching {
        stop: Arc<AtomicBool>,
        thread: JoinHandle<InputPin>,
    },
    Released,
}

/// Handle to one claimed GPIO line.
pub struct RppalLineHandle {
    line: LineId,
    state: State,
}

impl LineHandle for RppalLineHandle {
    fn on_edge(&mut self, sink: EdgeSink) -> Result<(), HardwareError> {
        let State::Claimed(pin) = std::mem::replace(&mut self.state, State::Released) else {
            return Err(GpioError::NotArmable.into_claim(self.line));
        };

        let stop = Arc::new(AtomicBool::new(false));
        let thread = thread::Builder::new()
            .name(format!("gpio-{}", self.line))
            .spawn({
                let stop = Arc::clone(&stop);
                move || watch(pin, &sink, &stop)
            })
            .map_err(|err| GpioError::Spawn(err).into_claim(self.line))?;

        self.state = State::Watching { stop, thread };
        Ok(())
    }

    fn close(&mut self) -> Result<(), ReleaseError> {
        let pin = match std::mem::replace(&mut self.state, State::Released) {
            State::Released => return Ok(()),
            State::Claimed(pin) => pin,
            State::Watching { stop, thread } => {
                stop.store(true, Ordering::Release);
                thread
                    .join()
                    .map_err(|_| GpioError::WatchPanicked.into_release(self.line))?
            }
        };
        release(self.line, pin)
    }
}

impl Drop for RppalLineHandle {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(line = %self.line, %err, "failed to release line on drop");
        }
    }
}

/// Clear the interrupt and drop the pin, which restores its previous mode.
fn release(line: LineId, mut pin: InputPin) -> Result<(), ReleaseError> {
    let cleared = pin
        .clear_interrupt()
        .map_err(|err| GpioError::from(err).into_release(line));
    drop(pin);
    tracing::debug!(line = %line, "GPIO line released");
    cleared
}

/// Forward interrupts of one pin until stopped, the sink closes, or the
/// driver faults. Returns the pin so it can be released by the owner.
fn watch(mut pin: InputPin, sink: &EdgeSink, stop: &AtomicBool) -> InputPin {
    let line = sink.line();
    while !stop.load(Ordering::Acquire) {
        match pin.poll_interrupt(false, Some(POLL_INTERVAL)) {
            Ok(Some(_event)) => {
                if sink.deliver(Instant::now()).is_err() {
                    tracing::debug!(line = %line, "edge sink closed, watch thread exiting");
                    break;
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(line = %line, %err, "GPIO interrupt poll failed");
                sink.fault(GpioError::from(err).into_delivery(line));
                break;
            }
        }
    }
    pin
}
