use std::cell::{Cell, RefCell};

use battery_monitor::bsp::display::{Display, COLUMNS, ROWS};
use battery_monitor::error::Fault;

/// Character display which resides in memory, rendered by the TUI
pub struct LcdGrid {
    attached: bool,
    grid: RefCell<Vec<Vec<char>>>,
    backlight: Cell<bool>,
}

impl LcdGrid {
    /// Factory function to create a blank display. A detached display fails to initialize.
    pub fn create(attached: bool) -> Self {
        LcdGrid {
            attached,
            grid: RefCell::new(vec![vec![' '; COLUMNS as usize]; ROWS as usize]),
            backlight: Cell::new(false),
        }
    }

    pub fn rows(&self) -> Vec<String> {
        self.grid
            .borrow()
            .iter()
            .map(|row| row.iter().collect())
            .collect()
    }

    pub fn is_lit(&self) -> bool {
        self.backlight.get()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl Display for LcdGrid {
    fn init(&self) -> Result<(), Fault> {
        if self.attached {
            Ok(())
        } else {
            Err(Fault::DisplayUnavailable)
        }
    }

    fn clear(&self) {
        for row in self.grid.borrow_mut().iter_mut() {
            row.iter_mut().for_each(|cell| *cell = ' ');
        }
    }

    fn print_at(&self, row: u8, col: u8, text: &str) {
        let mut grid = self.grid.borrow_mut();
        if let Some(cells) = grid.get_mut(row as usize) {
            for (cell, c) in cells.iter_mut().skip(col as usize).zip(text.chars()) {
                *cell = c;
            }
        }
    }

    fn set_backlight(&self, on: bool) {
        tracing::debug!(on, "backlight");
        self.backlight.set(on);
    }
}

#[cfg(test)]
mod test {
    use battery_monitor::bsp::display::Display;

    use crate::lcd::LcdGrid;

    #[test]
    fn text_is_cut_at_the_last_column() {
        let lcd = LcdGrid::create(true);
        lcd.print_at(1, 15, "13.06V");
        assert_eq!(lcd.rows()[1], "               13.06");
        lcd.print_at(7, 0, "ignored");
        assert_eq!(lcd.rows().len(), 4);
    }

    #[test]
    fn detached_display_fails_to_initialize() {
        assert!(LcdGrid::create(false).init().is_err());
        assert!(LcdGrid::create(true).init().is_ok());
    }
}
