use alloc::format;
use alloc::string::String;

use crate::bsp::display::{COLUMNS, ROWS};

/// Shown instead of a voltage which does not fit into `NN.NN`
pub const VOLTAGE_SENTINEL: &str = "--.--";

const MS_PER_MINUTE: u64 = 60 * 1000;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Always 5 characters wide. Anything that would round to 100.00 or more, negative values and
/// NaN show up as [VOLTAGE_SENTINEL].
pub fn format_voltage(voltage: f32) -> String {
    if voltage.is_nan() || voltage < 0.0 || voltage >= 99.995 {
        String::from(VOLTAGE_SENTINEL)
    } else {
        format!("{:5.2}", voltage)
    }
}

/// `DDDd HHh MMm`, every field wraps around on its own
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let minutes = (elapsed_ms / MS_PER_MINUTE) % 60;
    let hours = (elapsed_ms / MS_PER_HOUR) % 24;
    let days = (elapsed_ms / MS_PER_DAY) % 1000;
    format!("{:03}d {:02}h {:02}m", days, hours, minutes)
}

/// Row and column of the voltage field of battery [index], two batteries per row starting at
/// row 1. None if the grid has no room for it.
pub fn battery_cell(index: usize) -> Option<(u8, u8)> {
    let row = 1 + index / 2;
    let col = (index % 2) * (COLUMNS as usize / 2);
    if row < ROWS as usize {
        Some((row as u8, col as u8))
    } else {
        None
    }
}

/// Row of the supply estimate, the first row below the batteries if there is one left
pub fn supply_row(batteries: usize) -> Option<u8> {
    let row = 1 + (batteries + 1) / 2;
    if row < ROWS as usize {
        Some(row as u8)
    } else {
        None
    }
}
