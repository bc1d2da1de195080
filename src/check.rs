use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, trace};

use battery_monitor::frame::{check_line, split_checksum};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub headings: Option<String>,
    /// Data lines, the header and blank lines excluded
    pub checked: usize,
    pub failed: usize,
    pub malformed: usize,
}

impl Summary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.malformed == 0
    }
}

/// Verifies a captured telemetry log. The first non-blank line names the fields, every later
/// line must end with the CRC-8 of the text before its last comma. Mismatches and malformed
/// lines are reported to [out] as they are found.
pub fn check_log<R: BufRead, W: Write>(reader: R, out: &mut W) -> Result<Summary> {
    let mut summary = Summary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("cannot read line {}", index + 1))?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            debug!(line_number, "blank line skipped");
            continue;
        }

        if summary.headings.is_none() {
            let headings = match split_checksum(&line) {
                Ok((values, _)) => values.to_string(),
                Err(_) => line.trim().to_string(),
            };
            writeln!(out, "Data Headings: {}", headings)?;
            writeln!(out, "Checking CRCs...")?;
            summary.headings = Some(headings);
            continue;
        }

        summary.checked += 1;
        match check_line(&line) {
            Ok(check) if check.is_valid() => {
                trace!(line_number, crc = check.received, "ok");
            }
            Ok(check) => {
                summary.failed += 1;
                writeln!(
                    out,
                    "CRC8 Fail: Line {} = CRC#{} - {} ({}!{})",
                    line_number, summary.checked, check.values, check.received, check.computed
                )?;
            }
            Err(err) => {
                summary.malformed += 1;
                writeln!(out, "Malformed: Line {} - {}: {:?}", line_number, err, line)?;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use crate::check::{check_log, Summary};

    fn run(log: &str) -> (Summary, String) {
        let mut out = Vec::new();
        let summary = check_log(Cursor::new(log), &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn clean_log() {
        let (summary, out) = run(
            "Vcc,Bat1,Bat2,CRC8\n4.95,13.06,12.80,254\n1.00,52\n\n4.95,13.06,12.80,254\n",
        );
        assert_eq!(
            summary,
            Summary {
                headings: Some("Vcc,Bat1,Bat2".to_string()),
                checked: 3,
                failed: 0,
                malformed: 0,
            }
        );
        assert!(summary.is_clean());
        assert_eq!(out, "Data Headings: Vcc,Bat1,Bat2\nChecking CRCs...\n");
    }

    #[test]
    fn corrupted_lines_are_reported() {
        let (summary, out) = run("Vcc,Bat1,Bat2,CRC8\n4.95,13.06,12.80,254\n4.95,13.07,12.80,254\n");
        assert_eq!(summary.checked, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_clean());
        assert!(out.contains("CRC8 Fail: Line 3 = CRC#2 - 4.95,13.07,12.80 (254!"));
    }

    #[test]
    fn malformed_lines_are_counted_separately() {
        let (summary, out) = run("Vcc,Bat1,CRC8\n4.95\n4.95,13.06,xx\n");
        assert_eq!(summary.checked, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.malformed, 2);
        assert!(out.contains("Malformed: Line 2"));
        assert!(out.contains("Malformed: Line 3"));
    }

    #[test]
    fn empty_log_has_no_headings() {
        let (summary, out) = run("");
        assert_eq!(summary, Summary::default());
        assert!(out.is_empty());
    }
}
