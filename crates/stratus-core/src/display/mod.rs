//! Character display presenter
//!
//! The node optionally drives a small HD44780-style character LCD. The
//! display is a convenience: a missing or failing display never stops a
//! cycle, the [`Presenter`] simply turns into a no-op.

pub mod lcd1602;

use core::fmt::{Debug, Write};

use heapless::String;
use log::warn;
use thiserror_no_std::Error;

use crate::bus::BusAddress;
use crate::sensors::CanonicalReading;

pub use lcd1602::{Lcd1602, Lcd1602Connector};

/// Widest supported display line (40x2 / 40x4 modules).
pub const MAX_COLS: usize = 40;

pub type Line = String<MAX_COLS>;

pub const MSG_STARTING: &str = "BME280-Start...";
pub const MSG_DRIVER_MISSING: &str = "BME-Treiber fehlt";
pub const MSG_SENSOR_MISSING: &str = "BME nicht da";
pub const MSG_UPLOAD_ERROR: &str = "Upload ERROR";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    #[error("display at {address} did not respond during {operation}")]
    NotResponding {
        address: BusAddress,
        operation: &'static str,
    },
    #[error("unsupported display geometry {cols}x{rows}")]
    Geometry { cols: u8, rows: u8 },
}

/// Text-only display primitives
pub trait CharacterDisplay {
    type Error: Debug;

    fn clear(&mut self) -> impl Future<Output = Result<(), Self::Error>>;

    fn move_cursor(&mut self, col: u8, row: u8) -> impl Future<Output = Result<(), Self::Error>>;

    fn write_text(&mut self, text: &str) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Brings up a display found on the bus.
pub trait DisplayConnector {
    type Display: CharacterDisplay;

    fn attach(
        &mut self,
        address: BusAddress,
        rows: u8,
        cols: u8,
    ) -> impl Future<Output = Result<Self::Display, DisplayError>>;
}

/// Pad with spaces or truncate so `text` covers exactly `width` characters.
pub fn fit(text: &str, width: usize) -> Line {
    let width = width.min(MAX_COLS);
    let mut line = Line::new();

    for ch in text.chars().take(width) {
        // A multi-byte char may not fit the byte capacity; stop there.
        if line.push(ch).is_err() {
            break;
        }
    }
    while line.chars().count() < width {
        if line.push(' ').is_err() {
            break;
        }
    }
    line
}

/// Formats readings and status messages for a fixed-geometry display.
pub struct Presenter<D> {
    display: Option<D>,
    cols: u8,
    rows: u8,
}

impl<D: CharacterDisplay> Presenter<D> {
    /// A presenter with nothing attached; every call is a no-op.
    pub const fn headless(cols: u8, rows: u8) -> Self {
        Self {
            display: None,
            cols,
            rows,
        }
    }

    pub const fn attached(display: D, cols: u8, rows: u8) -> Self {
        Self {
            display: Some(display),
            cols,
            rows,
        }
    }

    pub const fn is_attached(&self) -> bool {
        self.display.is_some()
    }

    /// Give back the display, if one is still attached.
    pub fn into_inner(self) -> Option<D> {
        self.display
    }

    /// Write `text` at `(col, row)`, fitted to the columns left on that row.
    pub async fn line(&mut self, col: u8, row: u8, text: &str) {
        if row >= self.rows {
            return;
        }
        let width = usize::from(self.cols.saturating_sub(col));
        let fitted = fit(text, width);

        let Some(display) = self.display.as_mut() else {
            return;
        };
        let result = match display.move_cursor(col, row).await {
            Ok(()) => display.write_text(&fitted).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            self.detach(e);
        }
    }

    /// Clear the screen and show a one-line message.
    pub async fn message(&mut self, text: &str) {
        let Some(display) = self.display.as_mut() else {
            return;
        };
        if let Err(e) = display.clear().await {
            self.detach(e);
            return;
        }
        self.line(0, 0, text).await;
    }

    /// Clear the screen and show temperature and humidity.
    pub async fn reading(&mut self, reading: &CanonicalReading) {
        if !self.is_attached() {
            return;
        }

        let mut temperature = Line::new();
        let mut humidity = Line::new();
        // Lines longer than MAX_COLS are cut by the formatter error.
        let _ = write!(temperature, "Temp:{:5.1}C", reading.temperature);
        let _ = write!(humidity, "rF:{:7.1}%", reading.humidity);

        if let Some(display) = self.display.as_mut() {
            if let Err(e) = display.clear().await {
                self.detach(e);
                return;
            }
        }
        self.line(0, 0, &temperature).await;
        self.line(0, 1, &humidity).await;
    }

    /// Overwrite the second line with an upload status.
    pub async fn upload_status(&mut self, text: &str) {
        self.line(0, 1, text).await;
    }

    fn detach(&mut self, error: D::Error) {
        warn!("Display write failed, continuing headless: {:?}", error);
        self.display = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDisplay;
    use embassy_futures::block_on;

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5).as_str(), "abc  ");
        assert_eq!(fit("Upload OK (201) now", 16).as_str(), "Upload OK (201) ");
        assert_eq!(fit("exact", 5).as_str(), "exact");
        assert_eq!(fit("anything", 0).as_str(), "");
    }

    #[test]
    fn test_fit_counts_characters_not_bytes() {
        assert_eq!(fit("20°C", 6).as_str(), "20°C  ");
    }

    #[test]
    fn test_reading_lines() {
        let mut presenter = Presenter::attached(FakeDisplay::new(16, 2), 16, 2);
        let reading = CanonicalReading {
            temperature: 21.04,
            humidity: 43.26,
            pressure: 1008.3,
        };

        block_on(presenter.reading(&reading));

        let display = presenter.into_inner().unwrap();
        assert_eq!(display.row(0), "Temp: 21.0C     ");
        assert_eq!(display.row(1), "rF:   43.3%     ");
    }

    #[test]
    fn test_line_fits_remaining_columns() {
        let mut presenter = Presenter::attached(FakeDisplay::new(16, 2), 16, 2);

        block_on(presenter.line(10, 1, "truncated text"));

        let display = presenter.into_inner().unwrap();
        assert_eq!(display.row(1), "          trunca");
    }

    #[test]
    fn test_rows_outside_geometry_are_ignored() {
        let mut presenter = Presenter::attached(FakeDisplay::new(16, 2), 16, 2);
        block_on(presenter.line(0, 2, "hidden"));
        assert_eq!(presenter.into_inner().unwrap().writes(), 0);
    }

    #[test]
    fn test_failing_display_degrades_to_headless() {
        let mut presenter = Presenter::attached(FakeDisplay::failing(16, 2), 16, 2);

        block_on(presenter.message(MSG_STARTING));
        assert!(!presenter.is_attached());

        // Further calls are no-ops.
        block_on(presenter.upload_status(MSG_UPLOAD_ERROR));
    }

    #[test]
    fn test_headless_is_a_no_op() {
        let mut presenter = Presenter::<FakeDisplay>::headless(16, 2);
        block_on(presenter.message(MSG_SENSOR_MISSING));
        block_on(presenter.reading(&CanonicalReading::default()));
        assert!(presenter.into_inner().is_none());
    }
}
