//! Hardware abstraction traits for the duoclock firmware
//!
//! This crate defines the seam between the clock's decision logic and the
//! hardware it runs on. Board support crates implement these traits; the
//! core crate is written purely against them, so all of its behavior can be
//! exercised on a host machine with mock peripherals.
//!
//! - [`TimeService`]: a remote time authority reached over the network
//! - [`BackupClock`]: a battery-backed calendar clock peripheral
//! - [`QuadDisplay`]: a 4-character seven-segment display
//! - [`DstInput`]: a physical daylight-saving switch, read live
//! - [`Datetime`]: validated calendar date-time with Unix conversions
//!
//! The `defmt` feature derives `defmt::Format` on the shared types for use
//! on target; it is off by default so host builds carry no logger.

#![no_std]
#![deny(unsafe_code)]
// Public traits use `async fn`; implementors are single-executor embedded
// tasks and host tests, so no Send bound is wanted.
#![allow(async_fn_in_trait)]

pub mod backup_clock;
pub mod datetime;
pub mod display;
pub mod inputs;
pub mod time_service;

pub use backup_clock::{BackupClock, BackupClockError};
pub use datetime::{Datetime, DatetimeError};
pub use display::{DisplayError, QuadDisplay, BRIGHTNESS_MAX};
pub use inputs::DstInput;
pub use time_service::{TimeService, TimeServiceError};
