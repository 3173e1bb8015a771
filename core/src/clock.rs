//! System wall clock
//!
//! Seconds-resolution wall-clock time, kept as a `(unix, monotonic)` anchor
//! pair: a sync event stores the authoritative Unix time against the
//! monotonic counter at that moment, and reads extrapolate forward from
//! there. Between syncs the value is monotonically non-decreasing; a sync
//! correction may jump it in either direction.
//!
//! Owned by the sync controller, never a global.

#![deny(unsafe_code)]

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClockBase {
    unix: u64,
    anchor: u64,
}

/// The appliance's idea of current wall-clock time (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemClock {
    base: Option<ClockBase>,
}

impl SystemClock {
    /// A clock that has never been set.
    pub const fn new() -> Self {
        SystemClock { base: None }
    }

    /// True once a sync or fallback has provided a value.
    pub const fn is_set(&self) -> bool {
        self.base.is_some()
    }

    /// Anchors the clock: `unix` is the current time as of monotonic
    /// instant `now_mono` (whole seconds since boot).
    pub fn set(&mut self, unix: u64, now_mono: u64) {
        self.base = Some(ClockBase {
            unix,
            anchor: now_mono,
        });
    }

    /// Current Unix time, extrapolated from the last anchor. `None` until
    /// the first [`set`](Self::set).
    pub fn now(&self, now_mono: u64) -> Option<u64> {
        self.base
            .map(|base| base.unix + now_mono.saturating_sub(base.anchor))
    }
}
