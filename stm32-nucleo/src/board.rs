use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use core::fmt::Write;

use crate::hal::blocking::delay::DelayUs;
use crate::hal::digital::v2::{InputPin, OutputPin};
use crate::hal::watchdog;

use battery_monitor::bsp::clock::Clock;
use battery_monitor::bsp::delay::Delay;
use battery_monitor::bsp::led::Led;
use battery_monitor::bsp::pin::Pin;
use battery_monitor::bsp::serial::Serial;
use battery_monitor::bsp::watchdog::Watchdog;
use battery_monitor::error::Fault;

/// Millisecond clock driven by the main loop and by busy waits.
/// Elapsed time is tracked in microseconds so short waits are not lost.
pub struct TickClock {
    micros: Cell<u64>,
}

impl TickClock {
    pub fn create() -> Self {
        TickClock {
            micros: Cell::new(0),
        }
    }

    pub fn advance_us(&self, us: u32) {
        self.micros.set(self.micros.get() + us as u64);
    }
}

impl Clock for TickClock {
    fn now_ms(&self) -> u32 {
        (self.micros.get() / 1000) as u32
    }
}

/// SysTick delay which also moves the [TickClock] forward
pub struct BlockingDelay<'a, D: DelayUs<u32>> {
    pub delay: RefCell<D>,
    pub clock: &'a TickClock,
}

impl<D: DelayUs<u32>> Delay for BlockingDelay<'_, D> {
    fn delay_us(&self, us: u32) {
        self.delay.borrow_mut().delay_us(us);
        self.clock.advance_us(us);
    }
}

pub struct PullUpInput<P: InputPin> {
    pub pin: P,
}

impl<P: InputPin> Pin for PullUpInput<P> {
    fn is_high(&self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
}

pub struct GpioLed<P: OutputPin<Error = Infallible>> {
    pub pin: RefCell<P>,
    pub state: Cell<bool>,
}

impl<P: OutputPin<Error = Infallible>> Led for GpioLed<P> {
    fn set(&self, on: bool) {
        let mut pin = self.pin.borrow_mut();
        let _ = if on { pin.set_high() } else { pin.set_low() };
        self.state.set(on);
    }

    fn get(&self) -> bool {
        self.state.get()
    }
}

pub struct IndependentWatchdog<W: watchdog::Watchdog> {
    pub iwdg: RefCell<W>,
}

impl<W: watchdog::Watchdog> Watchdog for IndependentWatchdog<W> {
    fn feed(&self) {
        self.iwdg.borrow_mut().feed();
    }
}

/// USART telemetry. `None` when the port could not be configured.
pub struct UartSerial<U: Write> {
    pub port: RefCell<Option<U>>,
}

impl<U: Write> Serial for UartSerial<U> {
    fn begin(&self) -> Result<(), Fault> {
        if self.port.borrow().is_some() {
            Ok(())
        } else {
            Err(Fault::TransportUnavailable)
        }
    }

    fn write_line(&self, line: &str) {
        if let Some(port) = self.port.borrow_mut().as_mut() {
            // nothing to do about a failed write, the next frame carries its own checksum
            let _ = port.write_str(line).and_then(|_| port.write_str("\n"));
        }
    }
}
