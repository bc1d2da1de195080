use alloc::vec;
use alloc::vec::Vec;

pub const ADC_RESOLUTION_BITS: u8 = 10;
pub const MAX_RESOLUTION_BITS: u8 = 16;
pub const SAMPLES_PER_READING: u8 = 8;
pub const SETTLE_DELAY_US: u32 = 10_000;
pub const SAMPLE_SPACING_US: u32 = 1_000;

/// 3.3V rail of the board, wired to the reference input
pub const REFERENCE_VOLTS: f32 = 3.3;
pub const REFERENCE_CHANNEL: u8 = 0;

/// 30k / 15k divider, 15V at the terminals is 5V at the pin
pub const BATTERY_ATTENUATION: f32 = 3.0;
pub const BATTERY_LABELS: [&'static str; 4] = ["Bat1", "Bat2", "Bat3", "Bat4"];

pub const ACQUIRE_PERIOD: u32 = 5000;
pub const REPORT_PERIOD: u32 = 5000;
pub const DISPLAY_PERIOD: u32 = 1000;
pub const BACKLIGHT_PERIOD: u32 = 100;
pub const HEARTBEAT_PERIOD: u32 = 500;

/// Analog input as seen by the monitor. [attenuation] is the divider ratio in front of the pin,
/// 1.0 for the reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Channel {
    pub id: u8,
    pub label: &'static str,
    pub attenuation: f32,
}

impl Channel {
    pub const fn new(id: u8, label: &'static str, attenuation: f32) -> Self {
        Channel {
            id,
            label,
            attenuation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdcConfig {
    pub resolution_bits: u8,
    pub samples: u8,
    pub settle_us: u32,
    pub spacing_us: u32,
}

impl AdcConfig {
    /// Highest count, [resolution_bits] is taken as `1..=16`
    pub fn adc_max(&self) -> u16 {
        let bits = self.resolution_bits.clamp(1, MAX_RESOLUTION_BITS);
        ((1u32 << bits) - 1) as u16
    }
}

impl Default for AdcConfig {
    fn default() -> Self {
        AdcConfig {
            resolution_bits: ADC_RESOLUTION_BITS,
            samples: SAMPLES_PER_READING,
            settle_us: SETTLE_DELAY_US,
            spacing_us: SAMPLE_SPACING_US,
        }
    }
}

/// Task periods in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Periods {
    pub acquire: u32,
    pub report: u32,
    pub display: u32,
    pub backlight: u32,
    pub heartbeat: u32,
}

impl Default for Periods {
    fn default() -> Self {
        Periods {
            acquire: ACQUIRE_PERIOD,
            report: REPORT_PERIOD,
            display: DISPLAY_PERIOD,
            backlight: BACKLIGHT_PERIOD,
            heartbeat: HEARTBEAT_PERIOD,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    pub adc: AdcConfig,
    pub reference: Channel,
    pub reference_volts: f32,
    pub batteries: Vec<Channel>,
    pub periods: Periods,
}

impl MonitorConfig {
    /// Default configuration with the first [count] battery inputs, channels 1..=count
    pub fn with_batteries(count: usize) -> Self {
        let batteries = BATTERY_LABELS
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, label)| Channel::new(i as u8 + 1, label, BATTERY_ATTENUATION))
            .collect();
        MonitorConfig {
            batteries,
            ..MonitorConfig::default()
        }
    }

    /// Default channels and periods for a different analog front end: converter resolution,
    /// voltage of the reference input and the divider ratio of every battery input.
    /// The reference must stay below the converter supply, otherwise it reads at the rail and
    /// every calibration is rejected.
    pub fn with_front_end(resolution_bits: u8, reference_volts: f32, attenuation: f32) -> Self {
        let mut config = MonitorConfig::default();
        config.adc.resolution_bits = resolution_bits;
        config.reference_volts = reference_volts;
        for battery in config.batteries.iter_mut() {
            battery.attenuation = attenuation;
        }
        config
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            adc: AdcConfig::default(),
            reference: Channel::new(REFERENCE_CHANNEL, "Vref", 1.0),
            reference_volts: REFERENCE_VOLTS,
            batteries: vec![
                Channel::new(1, BATTERY_LABELS[0], BATTERY_ATTENUATION),
                Channel::new(2, BATTERY_LABELS[1], BATTERY_ATTENUATION),
                Channel::new(3, BATTERY_LABELS[2], BATTERY_ATTENUATION),
                Channel::new(4, BATTERY_LABELS[3], BATTERY_ATTENUATION),
            ],
            periods: Periods::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::config::{AdcConfig, MonitorConfig};

    #[test]
    fn adc_max_follows_resolution() {
        let mut adc = AdcConfig::default();
        assert_eq!(adc.adc_max(), 1023);
        adc.resolution_bits = 12;
        assert_eq!(adc.adc_max(), 4095);
        adc.resolution_bits = 16;
        assert_eq!(adc.adc_max(), u16::MAX);
    }

    #[test]
    fn adc_max_is_limited_to_sixteen_bits() {
        let mut adc = AdcConfig::default();
        adc.resolution_bits = 0;
        assert_eq!(adc.adc_max(), 1);
        for bits in [17u8, 24, 31, 32, 255].iter() {
            adc.resolution_bits = *bits;
            assert_eq!(adc.adc_max(), u16::MAX, "bits: {}", bits);
        }
    }

    #[test]
    fn front_end_applies_to_every_battery() {
        let config = MonitorConfig::with_front_end(12, 2.5, 5.0);
        assert_eq!(config.adc.adc_max(), 4095);
        assert_eq!(config.reference_volts, 2.5);
        assert_eq!(config.reference.attenuation, 1.0);
        assert_eq!(config.batteries.len(), 4);
        assert!(config.batteries.iter().all(|it| it.attenuation == 5.0));
    }

    #[test]
    fn battery_count_is_limited_by_available_labels() {
        assert_eq!(MonitorConfig::with_batteries(2).batteries.len(), 2);
        assert_eq!(MonitorConfig::with_batteries(9).batteries.len(), 4);
        assert_eq!(MonitorConfig::with_batteries(3).batteries[2].id, 3);
    }
}
