use crate::calibrator::CalibrationFactor;
use crate::sampler::RawSample;

pub fn to_voltage(raw: RawSample, factor: CalibrationFactor, attenuation: f32) -> f32 {
    factor.volts_per_count() * raw as f32 * attenuation
}

#[cfg(test)]
mod test {
    use crate::calibrator::calibrate;
    use crate::converter::to_voltage;

    fn close(lhs: f32, rhs: f32) -> bool {
        (lhs - rhs).abs() <= 1e-5 * rhs.abs().max(1.0)
    }

    #[test]
    fn battery_voltage_for_nominal_board() {
        let factor = calibrate(682, 3.3, 1023).unwrap();
        let voltage = to_voltage(900, factor, 3.0);
        assert!((voltage - 13.0645).abs() < 0.001, "voltage: {}", voltage);
    }

    #[test]
    fn voltage_is_linear_in_count_and_factor() {
        let factor = calibrate(682, 3.3, 1023).unwrap();
        let double_factor = calibrate(341, 3.3, 1023).unwrap();
        for raw in [1u16, 250, 511].iter() {
            let base = to_voltage(*raw, factor, 3.0);
            assert!(close(to_voltage(raw * 2, factor, 3.0), base * 2.0));
            assert!(close(to_voltage(*raw, double_factor, 3.0), base * 2.0));
        }
    }

    #[test]
    fn zero_count_is_zero_volts() {
        let factor = calibrate(682, 3.3, 1023).unwrap();
        assert_eq!(to_voltage(0, factor, 3.0), 0.0);
    }
}
