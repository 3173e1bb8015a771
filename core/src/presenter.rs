//! Display pair presenter
//!
//! Owns the two 4-character displays (clock face and date face) and knows
//! the two things the appliance ever shows on them: a status code pair or
//! an hour:minute / day:month reading.

#![deny(unsafe_code)]

use duoclock_hal::{DisplayError, QuadDisplay, BRIGHTNESS_MAX};

use crate::status::StatusCode;

/// The appliance's two displays, driven as one unit.
#[derive(Debug)]
pub struct DisplayPresenter<D: QuadDisplay> {
    clock_display: D,
    date_display: D,
}

impl<D: QuadDisplay> DisplayPresenter<D> {
    pub fn new(clock_display: D, date_display: D) -> Self {
        Self {
            clock_display,
            date_display,
        }
    }

    /// Applies one brightness level to both displays (clamped to the
    /// hardware range).
    pub fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        let level = level.min(BRIGHTNESS_MAX);
        self.clock_display.set_brightness(level)?;
        self.date_display.set_brightness(level)
    }

    /// Shows a status code pair.
    pub fn show_status(&mut self, code: StatusCode) -> Result<(), DisplayError> {
        let (clock_code, date_code) = code.codes();
        self.clock_display.show_text(clock_code)?;
        self.date_display.show_text(date_code)
    }

    /// Shows the clock reading: `HH:MM` on the clock face, `DD:MM` on the
    /// date face.
    pub fn show_clock(&mut self, hour: u8, minute: u8, day: u8, month: u8) -> Result<(), DisplayError> {
        self.clock_display.show_pair(hour, minute)?;
        self.date_display.show_pair(day, month)
    }

    /// Blanks both displays.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.clock_display.clear()?;
        self.date_display.clear()
    }

    /// (clock face, date face), for inspection.
    pub fn displays(&self) -> (&D, &D) {
        (&self.clock_display, &self.date_display)
    }

    pub fn displays_mut(&mut self) -> (&mut D, &mut D) {
        (&mut self.clock_display, &mut self.date_display)
    }
}
