//! Platform-agnostic core logic for the duoclock firmware
//!
//! Everything with real decision content lives here: the source-selection
//! and retry state machine ([`SyncController`]), the anchored wall clock
//! ([`SystemClock`]), the timezone and startup configuration, the status
//! code vocabulary, and the once-per-second run loop ([`ClockApp`]).
//! The crate has NO hardware dependencies; it talks to the outside world
//! only through the `duoclock-hal` traits, so the whole thing runs under
//! `cargo test` on a host with the mock peripherals from [`mocks`].
//!
//! ## Architecture
//!
//! One tick per second, fully sequential:
//!
//! ```text
//! ClockApp::tick(now)
//!   ├─ DstInput ──► effective offset (recomputed every tick)
//!   ├─ SystemClock + offset ──► DisplayPresenter (clock or status code)
//!   └─ SyncController::is_due? ──► attempt_sync
//!        ├─ TimeService fetch ── ok ──► SystemClock + BackupClock (warm)
//!        └─ fail ──► BackupClock read ── ok ──► SystemClock (degraded)
//!                                    └─ fail ──► Failed (clock untouched)
//! ```
//!
//! Any fault inside a tick is swallowed, logged, and replaced by a status
//! code on the displays; the loop never stops ticking.

#![no_std]
#![deny(unsafe_code)]

pub mod app;
pub mod clock;
pub mod config;
pub mod mocks;
pub mod presenter;
pub mod status;
pub mod sync;

pub use app::{ClockApp, LoopFault, TickReport};
pub use clock::SystemClock;
pub use config::{ClockConfig, TimezoneConfig};
pub use presenter::DisplayPresenter;
pub use status::StatusCode;
pub use sync::{
    SyncController, SyncOutcome, SyncSource, SyncState, FAILURE_RETRY_INTERVAL,
    NORMAL_SYNC_INTERVAL,
};
