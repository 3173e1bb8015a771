//! Mock peripherals
//!
//! No-hardware implementations of the `duoclock-hal` traits, used by this
//! crate's tests and available to any harness that wants to drive the clock
//! logic off-target. All of them are plain single-threaded state machines;
//! nothing here blocks or sleeps.

#![deny(unsafe_code)]

use duoclock_hal::{
    BackupClock, BackupClockError, Datetime, DisplayError, DstInput, QuadDisplay, TimeService,
    TimeServiceError,
};

/// Replays a fixed script of fetch results, one per call.
///
/// Calls past the end of the script report the service as unreachable.
pub struct ScriptedTimeService<'a> {
    script: &'a [Result<u64, TimeServiceError>],
    cursor: usize,
}

impl<'a> ScriptedTimeService<'a> {
    pub const fn new(script: &'a [Result<u64, TimeServiceError>]) -> Self {
        Self { script, cursor: 0 }
    }

    /// Number of fetches performed so far.
    pub const fn calls(&self) -> usize {
        self.cursor
    }
}

impl TimeService for ScriptedTimeService<'_> {
    async fn fetch_unix_time(&mut self) -> Result<u64, TimeServiceError> {
        let result = self
            .script
            .get(self.cursor)
            .copied()
            .unwrap_or(Err(TimeServiceError::Unreachable));
        self.cursor = self.cursor.saturating_add(1);
        result
    }
}

/// In-memory battery-backed clock.
///
/// Starts empty (reads report invalid contents, like a peripheral that lost
/// battery power), holding a value, or broken (bus errors on every access).
#[derive(Debug, Clone, Copy)]
pub struct FakeBackupClock {
    stored: Option<Datetime>,
    reads_fail: bool,
    writes_fail: bool,
    writes: usize,
}

impl FakeBackupClock {
    /// Never written; reads yield [`BackupClockError::Invalid`].
    pub const fn empty() -> Self {
        Self {
            stored: None,
            reads_fail: false,
            writes_fail: false,
            writes: 0,
        }
    }

    /// Holds `dt` as if it had been ticking since the last write.
    pub const fn holding(dt: Datetime) -> Self {
        Self {
            stored: Some(dt),
            reads_fail: false,
            writes_fail: false,
            writes: 0,
        }
    }

    /// Every access fails on the bus.
    pub const fn broken() -> Self {
        Self {
            stored: None,
            reads_fail: true,
            writes_fail: true,
            writes: 0,
        }
    }

    /// Same read behavior, but writes fail on the bus.
    pub const fn with_failing_writes(mut self) -> Self {
        self.writes_fail = true;
        self
    }

    /// The last value written, if any.
    pub const fn stored(&self) -> Option<Datetime> {
        self.stored
    }

    /// Number of successful writes.
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl BackupClock for FakeBackupClock {
    async fn read(&mut self) -> Result<Datetime, BackupClockError> {
        if self.reads_fail {
            return Err(BackupClockError::Bus);
        }
        self.stored.ok_or(BackupClockError::Invalid)
    }

    async fn write(&mut self, dt: &Datetime) -> Result<(), BackupClockError> {
        if self.writes_fail {
            return Err(BackupClockError::Bus);
        }
        self.stored = Some(*dt);
        self.writes += 1;
        Ok(())
    }
}

/// What a [`RecordingDisplay`] was asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Text([u8; 4]),
    Pair(u8, u8),
    Cleared,
}

/// Records every frame instead of driving hardware.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    frames: heapless::Vec<Frame, 32>,
    brightness: Option<u8>,
    fail_next: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next display call return [`DisplayError::NotResponding`].
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// All frames shown so far, oldest first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.frames.last().copied()
    }

    /// Brightness from the most recent `set_brightness` call.
    pub const fn brightness(&self) -> Option<u8> {
        self.brightness
    }

    fn record(&mut self, frame: Frame) -> Result<(), DisplayError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(DisplayError::NotResponding);
        }
        // Bounded recording; old history is not interesting once full
        if self.frames.is_full() {
            self.frames.remove(0);
        }
        let _ = self.frames.push(frame);
        Ok(())
    }
}

impl QuadDisplay for RecordingDisplay {
    fn show_text(&mut self, text: &[u8; 4]) -> Result<(), DisplayError> {
        self.record(Frame::Text(*text))
    }

    fn show_pair(&mut self, left: u8, right: u8) -> Result<(), DisplayError> {
        self.record(Frame::Pair(left, right))
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(DisplayError::NotResponding);
        }
        self.brightness = Some(level);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.record(Frame::Cleared)
    }
}

/// A DST switch a test can flip between ticks.
///
/// Interior mutability lets a test hand `&ManualSwitch` to the app and
/// still toggle the lever from outside while the app runs.
#[derive(Debug, Default)]
pub struct ManualSwitch {
    active: core::cell::Cell<bool>,
}

impl ManualSwitch {
    pub fn new(active: bool) -> Self {
        Self {
            active: core::cell::Cell::new(active),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.set(active);
    }
}

impl DstInput for ManualSwitch {
    fn is_active(&mut self) -> bool {
        self.active.get()
    }
}

impl DstInput for &ManualSwitch {
    fn is_active(&mut self) -> bool {
        self.active.get()
    }
}
