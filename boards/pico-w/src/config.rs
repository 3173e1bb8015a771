//! Compile-time configuration
//!
//! Every setting is baked in through `DUOCLOCK_*` environment variables at
//! build time; anything unset falls back to the shipped defaults. Setting
//! `DUOCLOCK_NTP_SERVER` to an empty string selects the DHCP gateway as the
//! time source.

#![deny(unsafe_code)]

use duoclock_core::{ClockConfig, TimezoneConfig};

pub fn load() -> ClockConfig {
    let defaults = ClockConfig::default();

    let ntp_server = match option_env!("DUOCLOCK_NTP_SERVER") {
        Some("") => None,
        Some(host) => Some(host),
        None => defaults.ntp_server,
    };

    ClockConfig {
        wifi_ssid: option_env!("DUOCLOCK_WIFI_SSID").unwrap_or(defaults.wifi_ssid),
        wifi_password: option_env!("DUOCLOCK_WIFI_PASSWORD").unwrap_or(defaults.wifi_password),
        wifi_country: option_env!("DUOCLOCK_WIFI_COUNTRY").unwrap_or(defaults.wifi_country),
        timezone: TimezoneConfig {
            base_offset_hours: parse_or(
                option_env!("DUOCLOCK_TZ_OFFSET_HOURS"),
                defaults.timezone.base_offset_hours,
            ),
        },
        ntp_server,
        brightness: parse_or(option_env!("DUOCLOCK_BRIGHTNESS"), defaults.brightness),
    }
    .sanitized()
}

fn parse_or<T: core::str::FromStr>(raw: Option<&str>, fallback: T) -> T {
    raw.and_then(|s| s.parse().ok()).unwrap_or(fallback)
}
