use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;

use log::{debug, error, info, warn};
use no_std_compat::cell::{Cell, RefCell};

use crate::bsp::adc::AnalogInput;
use crate::bsp::delay::Delay;
use crate::bsp::display::Display;
use crate::bsp::led::Led;
use crate::bsp::pin::Pin;
use crate::bsp::serial::Serial;
use crate::bsp::watchdog::Watchdog;
use crate::calibrator::Calibrator;
use crate::config::MonitorConfig;
use crate::converter::to_voltage;
use crate::display::{
    battery_cell, format_elapsed, format_voltage, supply_row, VOLTAGE_SENTINEL,
};
use crate::frame::{header, TelemetryFrame};
use crate::reading::ReadingSet;
use crate::sampler::Sampler;
use crate::scheduler::Scheduler;
use crate::uptime::Uptime;

/// Periodic tasks, in order of priority
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
pub enum Task {
    Acquire,
    Report,
    Display,
    Backlight,
    Heartbeat,
}

/// Control logic: measures, calibrates, reports and keeps the watchdog happy
pub struct BatteryMonitor<'a, B: Pin> {
    config: MonitorConfig,
    sampler: Sampler<'a>,
    calibrator: Calibrator,
    scheduler: Scheduler<Task>,
    backlight_pin: B,
    display: &'a dyn Display,
    serial: &'a dyn Serial,
    watchdog: &'a dyn Watchdog,
    heartbeat_led: &'a dyn Led,
    display_available: Cell<bool>,
    serial_available: Cell<bool>,
    backlight: Cell<Option<bool>>,
    readings: RefCell<Option<ReadingSet>>,
    next_cycle: Cell<u32>,
    uptime: Uptime,
}

impl<'a, B: Pin> BatteryMonitor<'a, B> {
    pub fn new(
        config: MonitorConfig,
        adc: &'a dyn AnalogInput,
        delay: &'a dyn Delay,
        backlight_pin: B,
        display: &'a dyn Display,
        serial: &'a dyn Serial,
        watchdog: &'a dyn Watchdog,
        heartbeat_led: &'a dyn Led,
    ) -> Self {
        let scheduler = Scheduler::create();
        scheduler.every(config.periods.acquire, Task::Acquire);
        scheduler.every(config.periods.report, Task::Report);
        scheduler.every(config.periods.display, Task::Display);
        scheduler.every(config.periods.backlight, Task::Backlight);
        scheduler.every(config.periods.heartbeat, Task::Heartbeat);

        let sampler = Sampler::new(adc, delay, config.adc);
        let calibrator = Calibrator::new(config.reference_volts, config.adc.adc_max());

        BatteryMonitor {
            config,
            sampler,
            calibrator,
            scheduler,
            backlight_pin,
            display,
            serial,
            watchdog,
            heartbeat_led,
            display_available: Cell::new(false),
            serial_available: Cell::new(false),
            backlight: Cell::new(None),
            readings: RefCell::new(None),
            next_cycle: Cell::new(0),
            uptime: Uptime::create(0),
        }
    }

    /// Brings up the outputs. A failing output is switched off, everything else keeps running.
    pub fn start(&self, now: u32) {
        self.uptime.reset(now);
        self.scheduler.reset(now);

        match self.display.init() {
            Ok(()) => {
                self.display_available.set(true);
                self.display.clear();
            }
            Err(fault) => {
                self.display_available.set(false);
                error!("{}, continuing without display", fault);
            }
        }

        match self.serial.begin() {
            Ok(()) => {
                self.serial_available.set(true);
                let labels = self.config.batteries.iter().map(|channel| channel.label);
                self.serial.write_line(&header(labels));
            }
            Err(fault) => {
                self.serial_available.set(false);
                error!("{}, continuing without telemetry", fault);
            }
        }

        info!(
            "monitoring {} batteries, reference {:.2}V on channel {}",
            self.config.batteries.len(),
            self.config.reference_volts,
            self.config.reference.id
        );
    }

    /// One iteration of the control loop, the clock is read once by the caller
    pub fn poll(&self, now: u32) -> usize {
        self.uptime.update(now);
        self.scheduler
            .run_once(now, &|task| self.process_task(task))
    }

    pub fn process_task(&self, task: Task) {
        match task {
            Task::Acquire => self.acquire(),
            Task::Report => self.report(),
            Task::Display => self.refresh_display(),
            Task::Backlight => self.check_backlight(),
            Task::Heartbeat => self.heartbeat(),
        }
    }

    /// Latest reading set, if any cycle succeeded so far
    pub fn readings(&self) -> Option<ReadingSet> {
        self.readings.borrow().clone()
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.uptime.elapsed_ms()
    }

    pub fn is_display_available(&self) -> bool {
        self.display_available.get()
    }

    pub fn is_serial_available(&self) -> bool {
        self.serial_available.get()
    }

    fn acquire(&self) {
        let reference_raw = self.sampler.sample(&self.config.reference);
        let factor = match self.calibrator.update(reference_raw) {
            Ok(factor) => factor,
            Err(fault) => {
                // the batteries are not sampled, a fresh count must never meet an old factor
                match self.readings.borrow_mut().as_mut() {
                    Some(readings) => {
                        readings.stale = true;
                        warn!("{}, keeping readings of cycle {}", fault, readings.cycle);
                    }
                    None => warn!("{}, no readings yet", fault),
                }
                return;
            }
        };

        let adc_max = self.config.adc.adc_max();
        let voltages: Vec<f32> = self
            .config
            .batteries
            .iter()
            .map(|channel| {
                let raw = self.sampler.sample(channel);
                if raw == 0 || raw == adc_max {
                    debug!("{} reads at the rail ({})", channel.label, raw);
                }
                to_voltage(raw, factor, channel.attenuation)
            })
            .collect();

        let cycle = self.next_cycle.get();
        self.next_cycle.set(cycle.wrapping_add(1));
        let supply_voltage = factor.supply_voltage(adc_max);
        debug!(
            "cycle {}: reference {} supply {:.3}V voltages {:?}",
            cycle, reference_raw, supply_voltage, voltages
        );

        self.readings.replace(Some(ReadingSet {
            cycle,
            factor,
            reference_raw,
            supply_voltage,
            voltages,
            stale: false,
        }));
    }

    fn report(&self) {
        if !self.serial_available.get() {
            return;
        }
        match self.readings.borrow().as_ref() {
            Some(readings) => {
                if readings.stale {
                    warn!("reporting stale readings of cycle {}", readings.cycle);
                }
                let frame = TelemetryFrame::encode(&readings.voltages, readings.supply_voltage);
                self.serial.write_line(&frame.to_string());
            }
            None => debug!("nothing to report yet"),
        }
    }

    fn refresh_display(&self) {
        if !self.display_available.get() {
            return;
        }
        let elapsed = format_elapsed(self.uptime.elapsed_ms());
        self.display.print_at(0, 0, "Up ");
        self.display.print_at(0, 3, &elapsed);

        let readings = self.readings.borrow();
        for index in 0..self.config.batteries.len() {
            if let Some((row, col)) = battery_cell(index) {
                let value = match readings.as_ref() {
                    Some(readings) => format_voltage(readings.voltages[index]),
                    None => VOLTAGE_SENTINEL.to_string(),
                };
                let text = format!("B{} {}", index + 1, value);
                self.display.print_at(row, col, &text);
            }
        }

        if let Some(row) = supply_row(self.config.batteries.len()) {
            let value = match readings.as_ref() {
                Some(readings) => format_voltage(readings.supply_voltage),
                None => VOLTAGE_SENTINEL.to_string(),
            };
            self.display.print_at(row, 0, "Vcc ");
            self.display.print_at(row, 4, &value);
        }
    }

    /// Acts on level changes only
    fn check_backlight(&self) {
        let level = self.backlight_pin.is_high();
        if self.backlight.get() == Some(level) {
            return;
        }
        self.backlight.set(Some(level));
        if self.display_available.get() {
            self.display.set_backlight(level);
        }
    }

    fn heartbeat(&self) {
        self.heartbeat_led.set(!self.heartbeat_led.get());
        self.watchdog.feed();
    }
}
