use no_std_compat::cell::Cell;

use crate::error::Fault;
use crate::sampler::RawSample;

/// Volts per converter count, derived from the reference channel in the current cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationFactor(f32);

impl CalibrationFactor {
    pub fn volts_per_count(&self) -> f32 {
        self.0
    }

    /// Estimate of the converter supply, reported to make supply drift visible
    pub fn supply_voltage(&self, adc_levels: u16) -> f32 {
        self.0 * adc_levels as f32
    }
}

/// Derives the scale factor from a reading of a known reference voltage.
///
/// A reading of 0 would divide by zero and a reading at [adc_levels] means the reference is at
/// or above the supply, neither can come from a working reference.
pub fn calibrate(
    reference_raw: RawSample,
    known_reference_voltage: f32,
    adc_levels: u16,
) -> Result<CalibrationFactor, Fault> {
    if reference_raw == 0 || reference_raw >= adc_levels {
        return Err(Fault::InvalidReference { raw: reference_raw });
    }
    Ok(CalibrationFactor(
        known_reference_voltage / reference_raw as f32,
    ))
}

/// Keeps the last valid factor and whether the latest reference reading was rejected.
pub struct Calibrator {
    reference_volts: f32,
    adc_levels: u16,
    last_valid: Cell<Option<CalibrationFactor>>,
    stale: Cell<bool>,
}

impl Calibrator {
    pub fn new(reference_volts: f32, adc_levels: u16) -> Self {
        Calibrator {
            reference_volts,
            adc_levels,
            last_valid: Cell::new(None),
            stale: Cell::new(false),
        }
    }

    pub fn update(&self, reference_raw: RawSample) -> Result<CalibrationFactor, Fault> {
        let result = calibrate(reference_raw, self.reference_volts, self.adc_levels);
        match result {
            Ok(factor) => {
                self.last_valid.set(Some(factor));
                self.stale.set(false);
            }
            Err(_) => self.stale.set(true),
        }
        result
    }

    pub fn last_valid(&self) -> Option<CalibrationFactor> {
        self.last_valid.get()
    }

    /// True if the last reference reading was rejected
    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }
}

#[cfg(test)]
mod test {
    use crate::calibrator::{calibrate, Calibrator};
    use crate::error::Fault;

    #[test]
    fn factor_is_reference_over_count() {
        for raw in [1u16, 17, 341, 682, 1000, 1022].iter() {
            let factor = calibrate(*raw, 3.3, 1023).unwrap();
            assert_eq!(factor.volts_per_count(), 3.3 / *raw as f32);
        }
    }

    #[test]
    fn supply_estimate_for_nominal_board() {
        let factor = calibrate(682, 3.3, 1023).unwrap();
        assert!((factor.volts_per_count() - 0.004839).abs() < 1e-6);
        assert!((factor.supply_voltage(1023) - 4.95).abs() < 0.001);
    }

    #[test]
    fn rail_readings_are_rejected() {
        assert_eq!(
            calibrate(0, 3.3, 1023),
            Err(Fault::InvalidReference { raw: 0 })
        );
        assert_eq!(
            calibrate(1023, 3.3, 1023),
            Err(Fault::InvalidReference { raw: 1023 })
        );
    }

    #[test]
    fn rejected_reading_keeps_last_valid_factor() {
        let calibrator = Calibrator::new(3.3, 1023);
        assert_eq!(calibrator.last_valid(), None);

        let good = calibrator.update(682).unwrap();
        assert!(!calibrator.is_stale());

        assert!(calibrator.update(0).is_err());
        assert!(calibrator.is_stale());
        assert_eq!(calibrator.last_valid(), Some(good));

        let newer = calibrator.update(700).unwrap();
        assert!(!calibrator.is_stale());
        assert_eq!(calibrator.last_valid(), Some(newer));
    }
}
