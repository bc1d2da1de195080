use alloc::vec::Vec;

use crate::calibrator::CalibrationFactor;
use crate::sampler::RawSample;

/// Everything one acquisition cycle produced. The factor and the voltages always come from the
/// same cycle, a cycle with a rejected reference produces no set at all.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingSet {
    pub cycle: u32,
    pub factor: CalibrationFactor,
    pub reference_raw: RawSample,
    pub supply_voltage: f32,
    pub voltages: Vec<f32>,
    /// Set when a later cycle could not calibrate, the values are older than one period
    pub stale: bool,
}
