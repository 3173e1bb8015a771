//! Four-character display contract
//!
//! The appliance carries two of these (one for the time, one for the date).
//! The contract is deliberately small: ASCII text for status codes, a pair
//! of zero-padded two-digit numbers for clock faces, a brightness level, and
//! a clear. Rendering is synchronous and quick; a module that stops
//! acknowledging surfaces as [`DisplayError`].

#![deny(unsafe_code)]

/// Highest brightness level the displays accept.
pub const BRIGHTNESS_MAX: u8 = 7;

/// A 4-character seven-segment display.
pub trait QuadDisplay {
    /// Shows four ASCII characters, left to right. Characters without a
    /// segment representation render blank.
    fn show_text(&mut self, text: &[u8; 4]) -> Result<(), DisplayError>;

    /// Shows two zero-padded two-digit numbers with the colon lit,
    /// e.g. `(14, 5)` renders `14:05`.
    fn show_pair(&mut self, left: u8, right: u8) -> Result<(), DisplayError>;

    /// Sets the brightness (0..=[`BRIGHTNESS_MAX`]; higher values clamp).
    /// Takes effect from the next frame.
    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError>;

    /// Blanks all four characters.
    fn clear(&mut self) -> Result<(), DisplayError>;
}

/// Why a display write failed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The display module did not acknowledge the transfer.
    NotResponding,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::NotResponding => write!(f, "display not responding"),
        }
    }
}

impl core::error::Error for DisplayError {}
