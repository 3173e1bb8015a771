//! Time-source selection and retry state machine
//!
//! The controller owns the system clock and decides, once per due attempt,
//! which source feeds it: the network time service if reachable, otherwise
//! the battery-backed clock, otherwise nothing. Source trust is asymmetric;
//! a network success always rewrites the backup clock so it stays warm for
//! the next outage, and a backup failure while the network is up costs
//! nothing.
//!
//! Scheduling is deliberately lopsided: a healthy sync is repeated every
//! six hours, but any failed attempt is retried after one minute, so a
//! transient outage self-heals quickly without hammering the service once
//! stable.

#![deny(unsafe_code)]

use duoclock_hal::{BackupClock, Datetime, TimeService};
use log::{debug, error, warn};

use crate::clock::SystemClock;
use crate::status::StatusCode;

/// Steady-state resync period (seconds).
pub const NORMAL_SYNC_INTERVAL: u64 = 21_600;

/// Retry delay after an attempt that was not a full success (seconds).
pub const FAILURE_RETRY_INTERVAL: u64 = 60;

/// What a sync attempt achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Network time obtained and applied.
    Synced,
    /// Network failed; the backup clock supplied the time.
    FallbackUsed,
    /// Neither source available; the system clock was left alone.
    BothFailed,
}

/// Which source last set the system clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
    Ntp,
    Rtc,
}

/// Controller states. There is no terminal state; the controller cycles
/// between `Synced` and the degraded states for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Powered up, network not yet reported.
    Boot,
    /// Network associated, first sync still pending.
    AwaitNetwork,
    /// A sync attempt is in flight.
    Syncing,
    /// Running on network time.
    Synced,
    /// Running on backup-clock time.
    DegradedRtc,
    /// No source available; retrying on the fast schedule.
    Failed,
}

/// Owns sync state and the system clock; see the module docs.
///
/// All fields are instance state held by the run loop, so tests can build
/// any number of controllers with mock peripherals and drive them through
/// arbitrary histories.
#[derive(Debug)]
pub struct SyncController {
    state: SyncState,
    clock: SystemClock,
    /// Monotonic second of the last attempt, successful or not.
    last_attempt: Option<u64>,
    last_outcome: Option<SyncOutcome>,
    last_source: Option<SyncSource>,
    consecutive_failures: u32,
}

impl SyncController {
    pub const fn new() -> Self {
        SyncController {
            state: SyncState::Boot,
            clock: SystemClock::new(),
            last_attempt: None,
            last_outcome: None,
            last_source: None,
            consecutive_failures: 0,
        }
    }

    pub const fn state(&self) -> SyncState {
        self.state
    }

    pub const fn last_source(&self) -> Option<SyncSource> {
        self.last_source
    }

    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Current Unix time from the owned system clock, if it has ever been
    /// set.
    pub fn now(&self, now_mono: u64) -> Option<u64> {
        self.clock.now(now_mono)
    }

    /// Records that the network associated. Only meaningful before the
    /// first sync attempt; afterwards the attempt outcomes drive the state.
    pub fn network_ready(&mut self) {
        if self.state == SyncState::Boot {
            self.state = SyncState::AwaitNetwork;
        }
    }

    /// True when a sync attempt should run now.
    ///
    /// Always true before the first attempt. Afterwards the interval
    /// depends only on the previous outcome: one minute after anything but
    /// a full success, six hours after a success. The fast retry is
    /// measured from the failed attempt itself, so the steady-state period
    /// never leaks into recovery latency.
    pub fn is_due(&self, now: u64) -> bool {
        let Some(last) = self.last_attempt else {
            return true;
        };
        let interval = match self.last_outcome {
            Some(SyncOutcome::Synced) => NORMAL_SYNC_INTERVAL,
            _ => FAILURE_RETRY_INTERVAL,
        };
        now >= last + interval
    }

    /// Runs one sync attempt against the given peripherals.
    ///
    /// `now` is the monotonic second of the attempt and becomes the base of
    /// the next retry interval regardless of the outcome.
    pub async fn attempt_sync<T: TimeService, B: BackupClock>(
        &mut self,
        now: u64,
        service: &mut T,
        backup: &mut B,
    ) -> SyncOutcome {
        let entry_state = self.state;
        self.state = SyncState::Syncing;
        self.last_attempt = Some(now);

        let outcome = match service.fetch_unix_time().await {
            Ok(unix) => {
                self.clock.set(unix, now);
                // Keep the backup clock warm for the next outage. Its
                // write result is discarded on purpose; a sync is a sync
                // even when the backup is unwritable.
                if let Err(e) = backup.write(&Datetime::from_unix(unix)).await {
                    warn!("backup clock write discarded: {e}");
                }
                self.last_source = Some(SyncSource::Ntp);
                self.consecutive_failures = 0;
                self.state = SyncState::Synced;
                SyncOutcome::Synced
            }
            Err(fetch_err) => {
                warn!("time service fetch failed: {fetch_err}");
                match backup.read().await {
                    Ok(dt) => {
                        self.clock.set(dt.to_unix(), now);
                        self.last_source = Some(SyncSource::Rtc);
                        self.state = SyncState::DegradedRtc;
                        SyncOutcome::FallbackUsed
                    }
                    Err(read_err) => {
                        error!("backup clock read failed: {read_err}");
                        self.state = SyncState::Failed;
                        SyncOutcome::BothFailed
                    }
                }
            }
        };

        if outcome != SyncOutcome::Synced {
            self.consecutive_failures += 1;
        }
        self.last_outcome = Some(outcome);
        debug!(
            "sync attempt at {now}: {outcome:?}, {entry_state:?} -> {:?}, failures {}",
            self.state, self.consecutive_failures
        );
        outcome
    }

    /// The code to display while the clock itself is not being rendered.
    /// Pure function of the current state.
    pub const fn current_status(&self) -> StatusCode {
        match self.state {
            SyncState::Boot => StatusCode::Booting,
            // Synced/DegradedRtc render the clock; a code for them only
            // shows if rendering is skipped for some reason.
            SyncState::AwaitNetwork
            | SyncState::Syncing
            | SyncState::Synced
            | SyncState::DegradedRtc => StatusCode::WifiUp,
            SyncState::Failed => StatusCode::RtcFailed,
        }
    }
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{FakeBackupClock, ScriptedTimeService};
    use duoclock_hal::TimeServiceError;
    use embassy_futures::block_on;

    const T0: u64 = 1_717_588_800; // 2024-06-05 12:00:00 UTC

    #[test]
    fn test_first_attempt_is_always_due() {
        let ctl = SyncController::new();
        assert!(ctl.is_due(0));
        assert!(ctl.is_due(u64::MAX));
        assert_eq!(ctl.state(), SyncState::Boot);
        assert_eq!(ctl.current_status(), StatusCode::Booting);
    }

    #[test]
    fn test_successful_fetch_sets_clock_and_backup() {
        let mut ctl = SyncController::new();
        let script = [Ok(T0)];
        let mut service = ScriptedTimeService::new(&script);
        let mut backup = FakeBackupClock::empty();

        let outcome = block_on(ctl.attempt_sync(100, &mut service, &mut backup));

        assert_eq!(outcome, SyncOutcome::Synced);
        assert_eq!(ctl.state(), SyncState::Synced);
        assert_eq!(ctl.last_source(), Some(SyncSource::Ntp));
        assert_eq!(ctl.consecutive_failures(), 0);
        assert_eq!(ctl.now(100), Some(T0));
        assert_eq!(ctl.now(101), Some(T0 + 1));
        // Round trip through the backup clock
        assert_eq!(backup.stored().map(|dt| dt.to_unix()), Some(T0));
    }

    #[test]
    fn test_backup_write_failure_does_not_downgrade_sync() {
        let mut ctl = SyncController::new();
        let script = [Ok(T0)];
        let mut service = ScriptedTimeService::new(&script);
        let mut backup = FakeBackupClock::empty().with_failing_writes();

        let outcome = block_on(ctl.attempt_sync(100, &mut service, &mut backup));

        assert_eq!(outcome, SyncOutcome::Synced);
        assert_eq!(ctl.state(), SyncState::Synced);
        assert_eq!(ctl.consecutive_failures(), 0);
        assert_eq!(ctl.now(100), Some(T0));
        assert_eq!(backup.stored(), None);
    }

    #[test]
    fn test_fallback_copies_backup_into_system_clock() {
        let mut ctl = SyncController::new();
        let script = [Err(TimeServiceError::Timeout)];
        let mut service = ScriptedTimeService::new(&script);
        let backup_time = Datetime::new(2024, 1, 1, 0, 0, 0).unwrap();
        let mut backup = FakeBackupClock::holding(backup_time);

        let outcome = block_on(ctl.attempt_sync(500, &mut service, &mut backup));

        assert_eq!(outcome, SyncOutcome::FallbackUsed);
        assert_eq!(ctl.state(), SyncState::DegradedRtc);
        assert_eq!(ctl.last_source(), Some(SyncSource::Rtc));
        assert_eq!(ctl.consecutive_failures(), 1);
        assert_eq!(ctl.now(500), Some(backup_time.to_unix()));
    }

    #[test]
    fn test_both_failed_leaves_clock_untouched() {
        let mut ctl = SyncController::new();

        // First attempt succeeds so the clock has a value to preserve
        let script = [Ok(T0), Err(TimeServiceError::Unreachable)];
        let mut service = ScriptedTimeService::new(&script);
        let mut backup = FakeBackupClock::empty();
        block_on(ctl.attempt_sync(0, &mut service, &mut backup));

        let mut backup = FakeBackupClock::broken();
        let outcome = block_on(ctl.attempt_sync(NORMAL_SYNC_INTERVAL, &mut service, &mut backup));

        assert_eq!(outcome, SyncOutcome::BothFailed);
        assert_eq!(ctl.state(), SyncState::Failed);
        assert_eq!(ctl.current_status(), StatusCode::RtcFailed);
        assert_eq!(ctl.consecutive_failures(), 1);
        // Still extrapolating from the first sync
        assert_eq!(
            ctl.now(NORMAL_SYNC_INTERVAL),
            Some(T0 + NORMAL_SYNC_INTERVAL)
        );
        // NTP still reported as the last source that set the clock
        assert_eq!(ctl.last_source(), Some(SyncSource::Ntp));
    }

    #[test]
    fn test_retry_schedule_asymmetry() {
        let mut ctl = SyncController::new();
        let script = [
            Ok(T0),
            Err(TimeServiceError::Timeout),
            Err(TimeServiceError::Timeout),
            Ok(T0 + 10_000),
        ];
        let mut service = ScriptedTimeService::new(&script);
        let mut backup = FakeBackupClock::holding(Datetime::new(2024, 1, 1, 0, 0, 0).unwrap());

        // Success at t=0: next due exactly one normal interval later
        block_on(ctl.attempt_sync(0, &mut service, &mut backup));
        assert!(!ctl.is_due(NORMAL_SYNC_INTERVAL - 1));
        assert!(ctl.is_due(NORMAL_SYNC_INTERVAL));

        // Fallback at t=NORMAL: due again 60s later, not six hours later
        let t1 = NORMAL_SYNC_INTERVAL;
        block_on(ctl.attempt_sync(t1, &mut service, &mut backup));
        assert!(!ctl.is_due(t1 + FAILURE_RETRY_INTERVAL - 1));
        assert!(ctl.is_due(t1 + FAILURE_RETRY_INTERVAL));

        // Total failure: same fast retry
        let t2 = t1 + FAILURE_RETRY_INTERVAL;
        let mut broken = FakeBackupClock::broken();
        block_on(ctl.attempt_sync(t2, &mut service, &mut broken));
        assert!(!ctl.is_due(t2 + FAILURE_RETRY_INTERVAL - 1));
        assert!(ctl.is_due(t2 + FAILURE_RETRY_INTERVAL));

        // Recovery: back on the slow schedule
        let t3 = t2 + FAILURE_RETRY_INTERVAL;
        block_on(ctl.attempt_sync(t3, &mut service, &mut backup));
        assert_eq!(ctl.state(), SyncState::Synced);
        assert_eq!(ctl.consecutive_failures(), 0);
        assert!(!ctl.is_due(t3 + NORMAL_SYNC_INTERVAL - 1));
        assert!(ctl.is_due(t3 + NORMAL_SYNC_INTERVAL));
    }

    #[test]
    fn test_consecutive_failures_accumulate_and_reset() {
        let mut ctl = SyncController::new();
        let script = [
            Err(TimeServiceError::Timeout),
            Err(TimeServiceError::BadResponse),
            Err(TimeServiceError::Unreachable),
            Ok(T0),
        ];
        let mut service = ScriptedTimeService::new(&script);
        let mut backup = FakeBackupClock::broken();

        for (i, t) in [0u64, 60, 120].into_iter().enumerate() {
            block_on(ctl.attempt_sync(t, &mut service, &mut backup));
            assert_eq!(ctl.consecutive_failures(), i as u32 + 1);
        }
        assert_eq!(ctl.state(), SyncState::Failed);

        let mut backup = FakeBackupClock::empty();
        block_on(ctl.attempt_sync(180, &mut service, &mut backup));
        assert_eq!(ctl.consecutive_failures(), 0);
        assert_eq!(ctl.state(), SyncState::Synced);
    }

    #[test]
    fn test_network_ready_only_leaves_boot() {
        let mut ctl = SyncController::new();
        ctl.network_ready();
        assert_eq!(ctl.state(), SyncState::AwaitNetwork);
        assert_eq!(ctl.current_status(), StatusCode::WifiUp);

        let script = [Ok(T0)];
        let mut service = ScriptedTimeService::new(&script);
        let mut backup = FakeBackupClock::empty();
        block_on(ctl.attempt_sync(0, &mut service, &mut backup));
        assert_eq!(ctl.state(), SyncState::Synced);

        // A late network-up report must not regress the state
        ctl.network_ready();
        assert_eq!(ctl.state(), SyncState::Synced);
    }
}
