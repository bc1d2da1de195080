use std::cell::Cell;
use std::thread::sleep;
use std::time::{Duration, Instant};

use battery_monitor::bsp::clock::Clock;
use battery_monitor::bsp::delay::Delay;
use battery_monitor::bsp::led::Led;
use battery_monitor::bsp::pin::Pin;
use battery_monitor::bsp::watchdog::Watchdog;

/// Milliseconds since the simulator started, wrapping like the device counter
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn create() -> Self {
        SystemClock {
            started: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        self.started.elapsed().as_millis() as u32
    }
}

pub struct SleepDelay;

impl Delay for SleepDelay {
    fn delay_us(&self, us: u32) {
        sleep(Duration::from_micros(us as u64));
    }
}

/// Led which resides in memory, for simulation or testing
pub struct DummyLed {
    on: Cell<bool>,
}

impl DummyLed {
    /// Factory function to create a dummy LED
    pub fn create() -> Self {
        DummyLed {
            on: Cell::new(false),
        }
    }
}

impl Led for DummyLed {
    fn set(&self, on: bool) {
        self.on.set(on);
    }

    fn get(&self) -> bool {
        self.on.get()
    }
}

/// Switch flipped from the keyboard
pub struct SwitchPin<'a> {
    level: &'a Cell<bool>,
}

impl<'a> SwitchPin<'a> {
    /// Factory function to create a [SwitchPin] reading the given level
    pub fn create(level: &'a Cell<bool>) -> Self {
        SwitchPin { level }
    }
}

impl Pin for SwitchPin<'_> {
    fn is_high(&self) -> bool {
        self.level.get()
    }
}

/// Remembers when it was fed last. The simulator only shows the age, it never resets.
pub struct SimWatchdog {
    timeout: Duration,
    last_feed: Cell<Instant>,
}

impl SimWatchdog {
    pub fn create(timeout: Duration) -> Self {
        SimWatchdog {
            timeout,
            last_feed: Cell::new(Instant::now()),
        }
    }

    pub fn since_feed(&self) -> Duration {
        self.last_feed.get().elapsed()
    }

    /// True if a real watchdog would have restarted the device by now
    pub fn has_expired(&self) -> bool {
        self.since_feed() > self.timeout
    }
}

impl Watchdog for SimWatchdog {
    fn feed(&self) {
        self.last_feed.set(Instant::now());
    }
}
