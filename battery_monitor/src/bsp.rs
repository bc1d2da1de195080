pub mod adc {
    /// Analog front end with a multiplexer in front of a single converter.
    /// [read] switches to the given input and performs one conversion.
    pub trait AnalogInput {
        fn read(&self, channel: u8) -> u16;
    }
}

pub mod delay {
    /// Busy wait. The sampler relies on the spacing being exact, not just on elapsed time.
    pub trait Delay {
        fn delay_us(&self, us: u32);
    }
}

pub mod clock {
    /// Free running millisecond counter, wraps at u32::MAX
    pub trait Clock {
        fn now_ms(&self) -> u32;
    }
}

pub mod pin {
    /// A digital input which is either high or low
    pub trait Pin {
        fn is_high(&self) -> bool;
    }
}

pub mod led {
    /// Heartbeat LED
    pub trait Led {
        fn set(&self, on: bool);
        fn get(&self) -> bool;
    }
}

pub mod display {
    use crate::error::Fault;

    pub const ROWS: u8 = 4;
    pub const COLUMNS: u8 = 20;

    /// Character display with a [ROWS] x [COLUMNS] grid and a switchable backlight.
    pub trait Display {
        /// Called once at startup. An error disables the display path only.
        fn init(&self) -> Result<(), Fault>;
        fn clear(&self);
        /// Places [text] starting at the given cell. Text beyond the last column is cut off.
        fn print_at(&self, row: u8, col: u8, text: &str);
        fn set_backlight(&self, on: bool);
    }
}

pub mod serial {
    use crate::error::Fault;

    /// Byte stream carrying the telemetry lines
    pub trait Serial {
        /// Called once at startup. An error disables the telemetry path only.
        fn begin(&self) -> Result<(), Fault>;
        /// Writes [line] followed by `\n`
        fn write_line(&self, line: &str);
    }
}

pub mod watchdog {
    /// External watchdog. Restarts the device if it is not fed in time.
    pub trait Watchdog {
        fn feed(&self);
    }
}
