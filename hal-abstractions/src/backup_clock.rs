//! Battery-backed calendar clock contract
//!
//! The backup clock persists across power loss and keeps ticking on its own
//! battery, but it drifts and its bus can fail, so every access is fallible.
//! The sync logic reads it only when the network authority is unavailable
//! and rewrites it after every successful network sync to keep it warm.

#![deny(unsafe_code)]

use crate::datetime::Datetime;

/// A battery-backed hardware calendar clock.
pub trait BackupClock {
    /// Reads the current date-time from the peripheral.
    async fn read(&mut self) -> Result<Datetime, BackupClockError>;

    /// Writes a date-time to the peripheral.
    async fn write(&mut self, dt: &Datetime) -> Result<(), BackupClockError>;
}

/// Why a backup clock access failed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupClockError {
    /// The peripheral did not answer on its bus.
    Bus,
    /// The peripheral answered, but its registers do not describe a
    /// plausible date-time (lost power, stopped oscillator, corruption).
    Invalid,
}

impl core::fmt::Display for BackupClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BackupClockError::Bus => write!(f, "backup clock bus error"),
            BackupClockError::Invalid => write!(f, "backup clock holds invalid time"),
        }
    }
}

impl core::error::Error for BackupClockError {}
