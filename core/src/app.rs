//! Per-tick application driver
//!
//! [`ClockApp`] is the whole appliance minus the hardware: it owns the sync
//! controller, the presenter, and the peripheral handles, and exposes the
//! single operation [`tick`](ClockApp::tick) that the board calls once per
//! wall-clock second.
//!
//! The reliability contract lives here: a tick may fail internally, but it
//! never propagates an error to the caller. Faults are logged, replaced by
//! the system-fault code on the displays, and forgotten by the next tick.

#![deny(unsafe_code)]

use duoclock_hal::{BackupClock, Datetime, DisplayError, DstInput, QuadDisplay, TimeService};
use log::error;

use crate::config::TimezoneConfig;
use crate::presenter::DisplayPresenter;
use crate::status::StatusCode;
use crate::sync::{SyncController, SyncOutcome, SyncState};

/// A fault swallowed by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopFault {
    /// A display refused a frame.
    Presentation(DisplayError),
}

impl From<DisplayError> for LoopFault {
    fn from(e: DisplayError) -> Self {
        LoopFault::Presentation(e)
    }
}

impl core::fmt::Display for LoopFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LoopFault::Presentation(e) => write!(f, "presentation fault: {e}"),
        }
    }
}

impl core::error::Error for LoopFault {}

/// What one tick did, for the board's logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Set when this tick ran a sync attempt.
    pub sync_outcome: Option<SyncOutcome>,
    /// True when a fault was swallowed during this tick.
    pub faulted: bool,
}

/// The clock appliance, generic over its four peripherals.
pub struct ClockApp<T, B, D, S>
where
    T: TimeService,
    B: BackupClock,
    D: QuadDisplay,
    S: DstInput,
{
    tz: TimezoneConfig,
    controller: SyncController,
    presenter: DisplayPresenter<D>,
    service: T,
    backup: B,
    dst: S,
}

impl<T, B, D, S> ClockApp<T, B, D, S>
where
    T: TimeService,
    B: BackupClock,
    D: QuadDisplay,
    S: DstInput,
{
    pub fn new(
        tz: TimezoneConfig,
        presenter: DisplayPresenter<D>,
        service: T,
        backup: B,
        dst: S,
    ) -> Self {
        Self {
            tz,
            controller: SyncController::new(),
            presenter,
            service,
            backup,
            dst,
        }
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    pub fn presenter(&self) -> &DisplayPresenter<D> {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut DisplayPresenter<D> {
        &mut self.presenter
    }

    /// Forwarded to the controller at bring-up.
    pub fn network_ready(&mut self) {
        self.controller.network_ready();
    }

    /// One run-loop iteration. `now` is the monotonic second of this tick.
    ///
    /// Renders first (clock when a source has been applied, status code
    /// otherwise), then runs a sync attempt if one is due. Never fails;
    /// see the module docs.
    pub async fn tick(&mut self, now: u64) -> TickReport {
        // Render before sync; a presentation fault must not delay the
        // sync schedule.
        let rendered = self.render(now);

        let mut sync_outcome = None;
        if self.controller.is_due(now) {
            let outcome = self
                .controller
                .attempt_sync(now, &mut self.service, &mut self.backup)
                .await;
            if outcome == SyncOutcome::BothFailed {
                // Surface the fetch failure for the rest of this tick;
                // from the next tick the Failed state shows its steady
                // code. Best effort on an already-degraded device.
                let _ = self.presenter.show_status(StatusCode::NtpFailed);
            }
            sync_outcome = Some(outcome);
        }

        match rendered {
            Ok(()) => TickReport {
                sync_outcome,
                faulted: false,
            },
            Err(fault) => {
                error!("tick fault swallowed: {fault}");
                let _ = self.presenter.show_status(StatusCode::SystemFault);
                TickReport {
                    sync_outcome,
                    faulted: true,
                }
            }
        }
    }

    fn render(&mut self, now: u64) -> Result<(), LoopFault> {
        // Live read: flipping the switch shifts the very next frame
        let offset = self.tz.effective_offset_hours(self.dst.is_active());

        if matches!(
            self.controller.state(),
            SyncState::Synced | SyncState::DegradedRtc
        ) {
            if let Some(unix) = self.controller.now(now) {
                let local = Datetime::from_unix(apply_offset(unix, offset));
                self.presenter
                    .show_clock(local.hour(), local.minute(), local.day(), local.month())?;
                return Ok(());
            }
        }
        self.presenter
            .show_status(self.controller.current_status())?;
        Ok(())
    }
}

/// Shifts a UTC timestamp by a whole-hour offset, clamping at the epoch.
fn apply_offset(unix: u64, offset_hours: i8) -> u64 {
    let shifted = unix as i64 + (offset_hours as i64) * 3600;
    shifted.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        FakeBackupClock, Frame, ManualSwitch, RecordingDisplay, ScriptedTimeService,
    };
    use crate::sync::{FAILURE_RETRY_INTERVAL, NORMAL_SYNC_INTERVAL};
    use duoclock_hal::TimeServiceError;
    use embassy_futures::block_on;

    const NOON_JUN5: u64 = 1_717_588_800; // 2024-06-05 12:00:00 UTC

    fn presenter() -> DisplayPresenter<RecordingDisplay> {
        DisplayPresenter::new(RecordingDisplay::new(), RecordingDisplay::new())
    }

    fn tz(base: i8) -> TimezoneConfig {
        TimezoneConfig {
            base_offset_hours: base,
        }
    }

    #[test]
    fn test_boot_tick_shows_status_then_syncs() {
        let script = [Ok(NOON_JUN5)];
        let switch = ManualSwitch::new(false);
        let mut app = ClockApp::new(
            tz(0),
            presenter(),
            ScriptedTimeService::new(&script),
            FakeBackupClock::empty(),
            &switch,
        );

        let report = block_on(app.tick(0));
        assert_eq!(report.sync_outcome, Some(SyncOutcome::Synced));
        assert!(!report.faulted);

        // The render happened before the sync, so this tick still showed
        // the boot code; the clock appears from the next tick.
        let (clock, _) = app.presenter().displays();
        assert_eq!(clock.frames(), &[Frame::Text(*b"BOOT")]);

        block_on(app.tick(1));
        let (clock, date) = app.presenter().displays();
        assert_eq!(clock.last_frame(), Some(Frame::Pair(12, 0)));
        assert_eq!(date.last_frame(), Some(Frame::Pair(5, 6)));
    }

    #[test]
    fn test_scenario_offset_and_dst() {
        // Base offset +1, DST on, clock 12:00:00 UTC on June 5th:
        // displays must read 14:00 and 05:06.
        let script = [Ok(NOON_JUN5)];
        let switch = ManualSwitch::new(true);
        let mut app = ClockApp::new(
            tz(1),
            presenter(),
            ScriptedTimeService::new(&script),
            FakeBackupClock::empty(),
            &switch,
        );

        block_on(app.tick(0));
        block_on(app.tick(1));

        let (clock, date) = app.presenter().displays();
        assert_eq!(clock.last_frame(), Some(Frame::Pair(14, 0)));
        assert_eq!(date.last_frame(), Some(Frame::Pair(5, 6)));
    }

    #[test]
    fn test_dst_toggle_shifts_hour_within_one_tick() {
        let script = [Ok(NOON_JUN5)];
        let switch = ManualSwitch::new(false);
        let mut app = ClockApp::new(
            tz(1),
            presenter(),
            ScriptedTimeService::new(&script),
            FakeBackupClock::empty(),
            &switch,
        );

        block_on(app.tick(0));
        block_on(app.tick(1));
        assert_eq!(
            app.presenter().displays().0.last_frame(),
            Some(Frame::Pair(13, 0))
        );

        // Flip the lever between ticks; no reboot, next frame shifts
        switch.set_active(true);
        block_on(app.tick(2));
        assert_eq!(
            app.presenter().displays().0.last_frame(),
            Some(Frame::Pair(14, 0))
        );

        switch.set_active(false);
        block_on(app.tick(3));
        assert_eq!(
            app.presenter().displays().0.last_frame(),
            Some(Frame::Pair(13, 0))
        );
    }

    #[test]
    fn test_scenario_fallback_to_backup_clock() {
        // Fetch times out; the backup clock holds 2024-01-01 00:00:00.
        let script = [Err(TimeServiceError::Timeout)];
        let switch = ManualSwitch::new(false);
        let backup_time = Datetime::new(2024, 1, 1, 0, 0, 0).unwrap();
        let mut app = ClockApp::new(
            tz(0),
            presenter(),
            ScriptedTimeService::new(&script),
            FakeBackupClock::holding(backup_time),
            &switch,
        );

        let report = block_on(app.tick(100));
        assert_eq!(report.sync_outcome, Some(SyncOutcome::FallbackUsed));
        assert_eq!(app.controller().state(), SyncState::DegradedRtc);
        assert_eq!(app.controller().now(100), Some(backup_time.to_unix()));

        // Fast retry: due again exactly 60s after the failed attempt
        assert!(!app.controller().is_due(100 + FAILURE_RETRY_INTERVAL - 1));
        assert!(app.controller().is_due(100 + FAILURE_RETRY_INTERVAL));

        // Degraded state still renders the clock, one second on
        block_on(app.tick(101));
        let (clock, date) = app.presenter().displays();
        assert_eq!(clock.last_frame(), Some(Frame::Pair(0, 0)));
        assert_eq!(date.last_frame(), Some(Frame::Pair(1, 1)));
    }

    #[test]
    fn test_scenario_total_failure_shows_codes_and_keeps_clock() {
        let script = [Ok(NOON_JUN5), Err(TimeServiceError::Unreachable)];
        let switch = ManualSwitch::new(false);
        let mut app = ClockApp::new(
            tz(0),
            presenter(),
            ScriptedTimeService::new(&script),
            FakeBackupClock::broken(),
            &switch,
        );

        // First sync succeeds even though the warm-up write is discarded
        let report = block_on(app.tick(0));
        assert_eq!(report.sync_outcome, Some(SyncOutcome::Synced));

        let due = NORMAL_SYNC_INTERVAL;
        let report = block_on(app.tick(due));
        assert_eq!(report.sync_outcome, Some(SyncOutcome::BothFailed));
        assert_eq!(app.controller().state(), SyncState::Failed);

        // The failing tick ends on the fetch-failure code
        let (clock, date) = app.presenter().displays();
        assert_eq!(clock.last_frame(), Some(Frame::Text(*b"ERR ")));
        assert_eq!(date.last_frame(), Some(Frame::Text(*b"NTP ")));

        // From the next tick the steady degraded code shows instead of
        // the (still ticking) clock
        block_on(app.tick(due + 1));
        let (clock, date) = app.presenter().displays();
        assert_eq!(clock.last_frame(), Some(Frame::Text(*b"ERR ")));
        assert_eq!(date.last_frame(), Some(Frame::Text(*b"RTC ")));

        // System clock unchanged by the failed attempt, still extrapolating
        assert_eq!(app.controller().now(due + 1), Some(NOON_JUN5 + due + 1));

        // Fast retry window
        assert!(!app.controller().is_due(due + FAILURE_RETRY_INTERVAL - 1));
        assert!(app.controller().is_due(due + FAILURE_RETRY_INTERVAL));
    }

    #[test]
    fn test_display_fault_is_swallowed_and_loop_continues() {
        let script = [Ok(NOON_JUN5)];
        let switch = ManualSwitch::new(false);
        let mut app = ClockApp::new(
            tz(0),
            presenter(),
            ScriptedTimeService::new(&script),
            FakeBackupClock::empty(),
            &switch,
        );
        block_on(app.tick(0));

        // Arm a one-shot display fault; the tick must report it, show the
        // system-fault code, and carry on
        app.presenter_mut().displays_mut().0.fail_next();
        let report = block_on(app.tick(1));
        assert!(report.faulted);
        assert_eq!(report.sync_outcome, None);

        let (clock, date) = app.presenter().displays();
        assert_eq!(clock.last_frame(), Some(Frame::Text(*b"SYS ")));
        assert_eq!(date.last_frame(), Some(Frame::Text(*b"ERR ")));

        // Next tick is back to normal rendering
        let report = block_on(app.tick(2));
        assert!(!report.faulted);
        assert_eq!(
            app.presenter().displays().0.last_frame(),
            Some(Frame::Pair(12, 0))
        );
    }
}
