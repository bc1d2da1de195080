use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};

use battery_monitor::bsp::serial::Serial;
use battery_monitor::error::Fault;

const SCROLLBACK: usize = 64;

/// Serial line of the simulator. Keeps the latest lines for the TUI and optionally captures
/// everything into a file which `frame_check` can verify afterwards.
pub struct TelemetryLog {
    connected: bool,
    lines: RefCell<VecDeque<String>>,
    capture: RefCell<Option<BufWriter<File>>>,
}

impl TelemetryLog {
    pub fn create(connected: bool, capture: Option<File>) -> Self {
        TelemetryLog {
            connected,
            lines: RefCell::new(VecDeque::with_capacity(SCROLLBACK)),
            capture: RefCell::new(capture.map(BufWriter::new)),
        }
    }

    /// Latest lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().iter().cloned().collect()
    }
}

impl Serial for TelemetryLog {
    fn begin(&self) -> Result<(), Fault> {
        if self.connected {
            Ok(())
        } else {
            Err(Fault::TransportUnavailable)
        }
    }

    fn write_line(&self, line: &str) {
        let mut lines = self.lines.borrow_mut();
        if lines.len() == SCROLLBACK {
            lines.pop_front();
        }
        lines.push_back(line.to_string());

        let mut capture = self.capture.borrow_mut();
        let failed = match capture.as_mut() {
            Some(writer) => writeln!(writer, "{}", line)
                .and_then(|_| writer.flush())
                .err(),
            None => None,
        };
        if let Some(err) = failed {
            tracing::warn!(%err, "capture stopped");
            *capture = None;
        }
    }
}
