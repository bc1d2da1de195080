use crate::bsp::adc::AnalogInput;
use crate::bsp::delay::Delay;
use crate::config::{AdcConfig, Channel};

/// Averaged converter count in `0..=adc_max`
pub type RawSample = u16;

/// Takes a burst of conversions from one input and reduces it to a single count.
pub struct Sampler<'a> {
    adc: &'a dyn AnalogInput,
    delay: &'a dyn Delay,
    config: AdcConfig,
}

impl<'a> Sampler<'a> {
    pub fn new(adc: &'a dyn AnalogInput, delay: &'a dyn Delay, config: AdcConfig) -> Self {
        Sampler { adc, delay, config }
    }

    /// Blocks for `settle_us + samples * spacing_us`.
    ///
    /// The first conversion after switching the multiplexer is thrown away. Each of the
    /// following conversions carries a +0.5 bias, so truncating the mean rounds to the nearest
    /// count instead of rounding down. The sum is kept in whole counts, `(2 * sum + n) / 2n` is
    /// the biased mean without losing the halves.
    pub fn sample(&self, channel: &Channel) -> RawSample {
        self.delay.delay_us(self.config.settle_us);
        let _ = self.adc.read(channel.id);

        let samples = self.config.samples.max(1) as u32;
        let mut sum: u32 = 0;
        for _ in 0..samples {
            self.delay.delay_us(self.config.spacing_us);
            sum += self.adc.read(channel.id) as u32;
        }

        let mean = (2 * sum + samples) / (2 * samples);
        mean.min(self.config.adc_max() as u32) as RawSample
    }
}

#[cfg(test)]
mod test {
    use std::cell::{Cell, RefCell};

    use crate::bsp::adc::AnalogInput;
    use crate::bsp::delay::Delay;
    use crate::config::{AdcConfig, Channel};
    use crate::sampler::Sampler;

    /// Replays the given counts, records every call
    struct ScriptedAdc {
        counts: RefCell<Vec<u16>>,
        channels: RefCell<Vec<u8>>,
    }

    impl ScriptedAdc {
        fn new(counts: &[u16]) -> Self {
            ScriptedAdc {
                counts: RefCell::new(counts.to_vec()),
                channels: RefCell::new(vec![]),
            }
        }
    }

    impl AnalogInput for ScriptedAdc {
        fn read(&self, channel: u8) -> u16 {
            self.channels.borrow_mut().push(channel);
            self.counts.borrow_mut().remove(0)
        }
    }

    struct CountingDelay {
        total_us: Cell<u32>,
        calls: RefCell<Vec<u32>>,
    }

    impl Delay for CountingDelay {
        fn delay_us(&self, us: u32) {
            self.total_us.set(self.total_us.get() + us);
            self.calls.borrow_mut().push(us);
        }
    }

    fn delay() -> CountingDelay {
        CountingDelay {
            total_us: Cell::new(0),
            calls: RefCell::new(vec![]),
        }
    }

    const BATTERY: Channel = Channel::new(3, "Bat3", 3.0);

    #[test]
    fn first_conversion_is_discarded() {
        let adc = ScriptedAdc::new(&[1023, 500, 500, 500, 500, 500, 500, 500, 500]);
        let delay = delay();
        let sampler = Sampler::new(&adc, &delay, AdcConfig::default());

        assert_eq!(sampler.sample(&BATTERY), 500);
        assert!(adc.counts.borrow().is_empty());
        assert!(adc.channels.borrow().iter().all(|it| *it == 3));
    }

    #[test]
    fn mean_is_rounded_to_nearest() {
        let config = AdcConfig {
            samples: 4,
            ..AdcConfig::default()
        };
        let delay = delay();

        // mean 100.25
        let adc = ScriptedAdc::new(&[0, 100, 100, 100, 101]);
        assert_eq!(Sampler::new(&adc, &delay, config).sample(&BATTERY), 100);

        // mean 100.5
        let adc = ScriptedAdc::new(&[0, 100, 101, 100, 101]);
        assert_eq!(Sampler::new(&adc, &delay, config).sample(&BATTERY), 101);

        // mean 100.75
        let adc = ScriptedAdc::new(&[0, 101, 101, 100, 101]);
        assert_eq!(Sampler::new(&adc, &delay, config).sample(&BATTERY), 101);
    }

    #[test]
    fn rails_are_preserved() {
        let config = AdcConfig {
            samples: 2,
            ..AdcConfig::default()
        };
        let delay = delay();

        let adc = ScriptedAdc::new(&[0, 0, 0]);
        assert_eq!(Sampler::new(&adc, &delay, config).sample(&BATTERY), 0);

        let adc = ScriptedAdc::new(&[1023, 1023, 1023]);
        assert_eq!(Sampler::new(&adc, &delay, config).sample(&BATTERY), 1023);
    }

    #[test]
    fn rounding_holds_at_full_resolution() {
        let config = AdcConfig {
            resolution_bits: 16,
            samples: 255,
            ..AdcConfig::default()
        };
        let delay = delay();

        // 128 of 255 at the upper count, mean 65534.502
        let mut counts = vec![0];
        counts.extend(std::iter::repeat(65535).take(128));
        counts.extend(std::iter::repeat(65534).take(127));
        let adc = ScriptedAdc::new(&counts);
        assert_eq!(Sampler::new(&adc, &delay, config).sample(&BATTERY), 65535);

        // 127 of 255, mean 65534.498
        let mut counts = vec![0];
        counts.extend(std::iter::repeat(65535).take(127));
        counts.extend(std::iter::repeat(65534).take(128));
        let adc = ScriptedAdc::new(&counts);
        assert_eq!(Sampler::new(&adc, &delay, config).sample(&BATTERY), 65534);

        let adc = ScriptedAdc::new(&[65535; 256]);
        assert_eq!(Sampler::new(&adc, &delay, config).sample(&BATTERY), 65535);
    }

    #[test]
    fn settle_and_spacing_delays_are_taken_in_order() {
        let config = AdcConfig {
            resolution_bits: 10,
            samples: 3,
            settle_us: 2000,
            spacing_us: 100,
        };
        let adc = ScriptedAdc::new(&[0, 1, 2, 3]);
        let delay = delay();
        Sampler::new(&adc, &delay, config).sample(&BATTERY);

        assert_eq!(*delay.calls.borrow(), vec![2000, 100, 100, 100]);
        assert_eq!(delay.total_us.get(), 2300);
    }
}
