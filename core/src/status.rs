//! Status code vocabulary
//!
//! Every condition the appliance can be in maps to a fixed pair of
//! 4-character codes, one per display. The displays are the only reporting
//! channel the device has, so this enum is the entire user-visible error
//! surface.

#![deny(unsafe_code)]

/// One displayable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Power-up, nothing attempted yet.
    Booting,
    /// WiFi association gave up after its bounded retry.
    WifiFailed,
    /// WiFi associated; shown briefly at bring-up and while the first
    /// sync is pending.
    WifiUp,
    /// The time service fetch failed and the backup clock was unreadable;
    /// shown for the remainder of the failing tick.
    NtpFailed,
    /// Steady code for the fully degraded state (no source available).
    RtcFailed,
    /// A fault was swallowed by the run loop.
    SystemFault,
}

impl StatusCode {
    /// The 4-character codes for (clock display, date display).
    pub const fn codes(&self) -> (&'static [u8; 4], &'static [u8; 4]) {
        match self {
            StatusCode::Booting => (b"BOOT", b"-ING"),
            StatusCode::WifiFailed => (b"WIFI", b"ERR "),
            StatusCode::WifiUp => (b"WIFI", b"UP  "),
            StatusCode::NtpFailed => (b"ERR ", b"NTP "),
            StatusCode::RtcFailed => (b"ERR ", b"RTC "),
            StatusCode::SystemFault => (b"SYS ", b"ERR "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_displayable_ascii() {
        let all = [
            StatusCode::Booting,
            StatusCode::WifiFailed,
            StatusCode::WifiUp,
            StatusCode::NtpFailed,
            StatusCode::RtcFailed,
            StatusCode::SystemFault,
        ];
        for code in all {
            let (clock, date) = code.codes();
            for &b in clock.iter().chain(date.iter()) {
                assert!(b.is_ascii_uppercase() || b == b' ' || b == b'-');
            }
        }
    }

    #[test]
    fn test_degraded_codes() {
        assert_eq!(StatusCode::NtpFailed.codes(), (b"ERR ", b"NTP "));
        assert_eq!(StatusCode::RtcFailed.codes(), (b"ERR ", b"RTC "));
    }
}
