//! Character LCD rendered into the log

use std::convert::Infallible;

use log::info;
use stratus_core::bus::BusAddress;
use stratus_core::display::{CharacterDisplay, DisplayConnector, DisplayError};

pub struct TerminalLcd {
    cells: Vec<Vec<char>>,
    cursor: (usize, usize),
}

impl TerminalLcd {
    pub fn new(cols: u8, rows: u8) -> Self {
        Self {
            cells: vec![vec![' '; usize::from(cols)]; usize::from(rows)],
            cursor: (0, 0),
        }
    }

    /// Current screen, one string per row.
    pub fn frame(&self) -> Vec<String> {
        self.cells.iter().map(|row| row.iter().collect()).collect()
    }
}

impl CharacterDisplay for TerminalLcd {
    type Error = Infallible;

    async fn clear(&mut self) -> Result<(), Infallible> {
        for row in &mut self.cells {
            row.fill(' ');
        }
        self.cursor = (0, 0);
        Ok(())
    }

    async fn move_cursor(&mut self, col: u8, row: u8) -> Result<(), Infallible> {
        self.cursor = (usize::from(col), usize::from(row));
        Ok(())
    }

    async fn write_text(&mut self, text: &str) -> Result<(), Infallible> {
        let (mut col, row) = self.cursor;
        if let Some(cells) = self.cells.get_mut(row) {
            for ch in text.chars() {
                if let Some(cell) = cells.get_mut(col) {
                    *cell = ch;
                }
                col += 1;
            }
        }
        self.cursor = (col, row);

        let frame: Vec<String> = self.frame().into_iter().map(|r| format!("|{r}|")).collect();
        info!("LCD {}", frame.join(" "));
        Ok(())
    }
}

/// Attaches a [`TerminalLcd`], or refuses like a backpack that stopped answering.
pub struct TerminalLcdConnector {
    broken: bool,
}

impl TerminalLcdConnector {
    pub const fn new(broken: bool) -> Self {
        Self { broken }
    }
}

impl DisplayConnector for TerminalLcdConnector {
    type Display = TerminalLcd;

    async fn attach(
        &mut self,
        address: BusAddress,
        rows: u8,
        cols: u8,
    ) -> Result<TerminalLcd, DisplayError> {
        if self.broken {
            return Err(DisplayError::NotResponding {
                address,
                operation: "init",
            });
        }
        info!("Simulated {}x{} LCD at {}", cols, rows, address);
        Ok(TerminalLcd::new(cols, rows))
    }
}
