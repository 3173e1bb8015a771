//! Startup configuration
//!
//! Read once at boot and never reloaded; the only live input after startup
//! is the DST switch. Defaults mirror a central-European install.

#![deny(unsafe_code)]

use duoclock_hal::BRIGHTNESS_MAX;

/// Base timezone, without the daylight-saving component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimezoneConfig {
    /// Whole hours east of UTC (negative = west).
    pub base_offset_hours: i8,
}

impl TimezoneConfig {
    /// Offset to apply right now. The DST switch is sampled by the caller
    /// on every tick, so flipping it takes effect on the next render.
    pub fn effective_offset_hours(&self, dst_active: bool) -> i8 {
        self.base_offset_hours + if dst_active { 1 } else { 0 }
    }
}

/// Everything the appliance needs to know at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// WiFi network name.
    pub wifi_ssid: &'static str,
    /// WiFi passphrase.
    pub wifi_password: &'static str,
    /// Two-letter regulatory region for the radio.
    pub wifi_country: &'static str,
    /// Base timezone offset.
    pub timezone: TimezoneConfig,
    /// NTP server hostname. `None` means use the network gateway as the
    /// time source.
    pub ntp_server: Option<&'static str>,
    /// Display brightness, 0 (low) to 7 (high).
    pub brightness: u8,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: "your-wifi-ssid",
            wifi_password: "your-wifi-password",
            wifi_country: "NL",
            timezone: TimezoneConfig {
                base_offset_hours: 1,
            },
            ntp_server: Some("europe.pool.ntp.org"),
            brightness: BRIGHTNESS_MAX,
        }
    }
}

impl ClockConfig {
    /// Clamps out-of-range values to something the hardware accepts.
    /// UTC offsets run from -12:00 to +14:00.
    pub fn sanitized(mut self) -> Self {
        self.brightness = self.brightness.min(BRIGHTNESS_MAX);
        self.timezone.base_offset_hours = self.timezone.base_offset_hours.clamp(-12, 14);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_offset_tracks_dst() {
        let tz = TimezoneConfig {
            base_offset_hours: 1,
        };
        assert_eq!(tz.effective_offset_hours(false), 1);
        assert_eq!(tz.effective_offset_hours(true), 2);

        let utc = TimezoneConfig::default();
        assert_eq!(utc.effective_offset_hours(false), 0);
        assert_eq!(utc.effective_offset_hours(true), 1);
    }

    #[test]
    fn test_sanitize_clamps() {
        let cfg = ClockConfig {
            brightness: 12,
            timezone: TimezoneConfig {
                base_offset_hours: 40,
            },
            ..ClockConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.brightness, BRIGHTNESS_MAX);
        assert_eq!(cfg.timezone.base_offset_hours, 14);
    }
}
