use std::cell::Cell;
use std::time::Instant;

use rand::Rng;

use battery_monitor::bsp::adc::AnalogInput;
use battery_monitor::config::{Channel, MonitorConfig};

/// Lead acid battery under a light load, volts per second
const DISCHARGE_RATE: f32 = 0.0005;
const SUPPLY_DRIFT_PERIOD_S: f32 = 40.0;
const NOISE_COUNTS: f32 = 1.5;

/// Converter whose supply wanders around its nominal value, so uncalibrated counts drift
/// while calibrated voltages stay put.
pub struct SimulatedAdc {
    started: Instant,
    supply: f32,
    drift: f32,
    adc_max: u16,
    reference: Channel,
    reference_volts: f32,
    batteries: Vec<(Channel, f32)>,
    reference_fault: Cell<bool>,
}

impl SimulatedAdc {
    /// Factory function to create an ADC matching the given configuration
    pub fn create(config: &MonitorConfig, supply: f32, drift: f32) -> Self {
        let batteries = config
            .batteries
            .iter()
            .enumerate()
            .map(|(i, channel)| (*channel, 13.2 - 0.15 * i as f32))
            .collect();
        SimulatedAdc {
            started: Instant::now(),
            supply,
            drift,
            adc_max: config.adc.adc_max(),
            reference: config.reference,
            reference_volts: config.reference_volts,
            batteries,
            reference_fault: Cell::new(false),
        }
    }

    fn seconds(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    pub fn supply_voltage(&self) -> f32 {
        let phase = self.seconds() / SUPPLY_DRIFT_PERIOD_S * std::f32::consts::TAU;
        self.supply + self.drift * phase.sin()
    }

    /// Voltage at the battery terminals, before the divider
    pub fn battery_voltage(&self, index: usize) -> Option<f32> {
        self.batteries
            .get(index)
            .map(|(_, initial)| initial - DISCHARGE_RATE * self.seconds())
    }

    /// A lost reference reads as ground
    pub fn toggle_reference_fault(&self) {
        self.reference_fault.set(!self.reference_fault.get());
    }

    pub fn has_reference_fault(&self) -> bool {
        self.reference_fault.get()
    }

    fn counts(&self, volts_at_pin: f32) -> u16 {
        let noise = rand::thread_rng().gen_range(-NOISE_COUNTS..NOISE_COUNTS);
        let counts = volts_at_pin / self.supply_voltage() * self.adc_max as f32 + noise;
        counts.round().max(0.0).min(self.adc_max as f32) as u16
    }
}

impl AnalogInput for SimulatedAdc {
    fn read(&self, channel: u8) -> u16 {
        if channel == self.reference.id {
            return if self.reference_fault.get() {
                0
            } else {
                self.counts(self.reference_volts)
            };
        }
        match self
            .batteries
            .iter()
            .position(|(battery, _)| battery.id == channel)
        {
            Some(index) => {
                let (battery, _) = self.batteries[index];
                let volts = self.battery_voltage(index).unwrap_or(0.0);
                self.counts(volts / battery.attenuation)
            }
            // floating input
            None => 0,
        }
    }
}
