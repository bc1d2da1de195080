//! Telemetry line: `<vcc>,<bat1>,...,<batN>,<crc8>`
//!
//! Every value has exactly two decimals. The CRC-8 (Dallas/Maxim, reflected polynomial 0x8C,
//! processed LSB first, initial value 0) covers the characters before the last comma and is
//! written as a decimal number, so a receiver can verify a line without knowing the channel count.

use alloc::string::String;
use core::fmt;
use core::fmt::Write;

use thiserror::Error;

const CRC8_POLY: u8 = 0x8C;

/// Last field of the header line, in place of the checksum
pub const CHECKSUM_HEADING: &str = "CRC8";
pub const SUPPLY_HEADING: &str = "Vcc";

pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        let mut byte = byte;
        for _ in 0..8 {
            let feedback = (crc ^ byte) & 0x01;
            crc >>= 1;
            if feedback != 0 {
                crc ^= CRC8_POLY;
            }
            byte >>= 1;
        }
    }
    crc
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelemetryFrame {
    values: String,
    checksum: u8,
}

impl TelemetryFrame {
    /// [reference] is the first field, [values] follow in the given order
    pub fn encode(values: &[f32], reference: f32) -> Self {
        let mut text = String::new();
        let _ = write!(text, "{:.2}", reference);
        for value in values {
            let _ = write!(text, ",{:.2}", value);
        }
        let checksum = crc8(text.as_bytes());
        TelemetryFrame {
            values: text,
            checksum,
        }
    }

    /// The comma separated values the checksum covers
    pub fn values(&self) -> &str {
        &self.values
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }
}

impl fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.values, self.checksum)
    }
}

/// Names the fields of the following lines, emitted once at startup
pub fn header<'a, I>(labels: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut text = String::from(SUPPLY_HEADING);
    for label in labels {
        text.push(',');
        text.push_str(label);
    }
    text.push(',');
    text.push_str(CHECKSUM_HEADING);
    text
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("line has no checksum field")]
    MissingChecksum,

    #[error("checksum field {0:?} is not a number in 0..=255")]
    BadChecksum(String),
}

/// Result of recomputing the checksum of a received line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCheck<'a> {
    pub values: &'a str,
    pub received: u8,
    pub computed: u8,
}

impl FrameCheck<'_> {
    pub fn is_valid(&self) -> bool {
        self.received == self.computed
    }
}

/// Splits a line at its last comma. Surrounding whitespace and the line terminator are ignored.
pub fn split_checksum(line: &str) -> Result<(&str, &str), FrameError> {
    let line = line.trim();
    match line.rfind(',') {
        Some(position) => Ok((&line[..position], line[position + 1..].trim())),
        None => Err(FrameError::MissingChecksum),
    }
}

pub fn check_line(line: &str) -> Result<FrameCheck<'_>, FrameError> {
    let (values, checksum) = split_checksum(line)?;
    let received = checksum
        .parse::<u8>()
        .map_err(|_| FrameError::BadChecksum(String::from(checksum)))?;
    Ok(FrameCheck {
        values,
        received,
        computed: crc8(values.as_bytes()),
    })
}
