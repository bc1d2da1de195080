use core::cell::{Cell, RefCell};
use core::fmt::Write;

use jlink_rtt::NonBlockingOutput;
use log::{LevelFilter, Metadata, Record};

use battery_monitor::bsp::display::Display;
use battery_monitor::error::Fault;

/// Stand-in for the character LCD: every update is mirrored to the RTT channel
pub struct RttDisplay {
    output: RefCell<NonBlockingOutput>,
    backlight: Cell<bool>,
}

impl RttDisplay {
    pub fn create() -> Self {
        RttDisplay {
            output: RefCell::new(NonBlockingOutput::new()),
            backlight: Cell::new(false),
        }
    }
}

impl Display for RttDisplay {
    fn init(&self) -> Result<(), Fault> {
        Ok(())
    }

    fn clear(&self) {
        let _ = writeln!(self.output.borrow_mut(), "lcd: clear");
    }

    fn print_at(&self, row: u8, col: u8, text: &str) {
        let _ = writeln!(self.output.borrow_mut(), "lcd {}:{} {}", row, col, text);
    }

    fn set_backlight(&self, on: bool) {
        if self.backlight.replace(on) != on {
            let _ = writeln!(self.output.borrow_mut(), "lcd: backlight {}", on);
        }
    }
}

struct RttLogger;

impl log::Log for RttLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut output = NonBlockingOutput::new();
            let _ = writeln!(output, "{} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: RttLogger = RttLogger;

/// Must be called once, before interrupts are enabled
pub fn init_logger(level: LevelFilter) {
    unsafe {
        let _ = log::set_logger_racy(&LOGGER);
    }
    log::set_max_level(level);
}
