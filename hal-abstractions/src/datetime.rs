//! Calendar date-time with O(1) Unix conversions
//!
//! Conversions implement Howard Hinnant's civil_from_days and days_from_civil
//! algorithms (the ones used by C++20 `<chrono>`), so they need no year
//! iteration and handle every Gregorian leap-year rule correctly.
//! Reference: <http://howardhinnant.github.io/date_algorithms.html>
//!
//! Valid range: 1970 through the u16 year limit; UTC only, no leap seconds.

#![deny(unsafe_code)]

const SECONDS_PER_DAY: u64 = 86_400;

/// A validated calendar date and time.
///
/// Construction goes through [`Datetime::new`], so a value of this type
/// always holds a real calendar date (leap days included) and a real
/// time of day.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datetime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

/// The field that failed validation in [`Datetime::new`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeError {
    /// Year before 1970.
    Year,
    /// Month outside 1-12.
    Month,
    /// Day outside the month's length.
    Day,
    /// Hour above 23.
    Hour,
    /// Minute above 59.
    Minute,
    /// Second above 59.
    Second,
}

impl core::fmt::Display for DatetimeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DatetimeError::Year => write!(f, "year out of range"),
            DatetimeError::Month => write!(f, "month out of range"),
            DatetimeError::Day => write!(f, "day out of range"),
            DatetimeError::Hour => write!(f, "hour out of range"),
            DatetimeError::Minute => write!(f, "minute out of range"),
            DatetimeError::Second => write!(f, "second out of range"),
        }
    }
}

impl core::error::Error for DatetimeError {}

impl Default for Datetime {
    fn default() -> Self {
        Datetime {
            year: 1970,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl Datetime {
    /// Creates a `Datetime`, rejecting impossible calendar values.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DatetimeError> {
        if year < 1970 {
            return Err(DatetimeError::Year);
        }
        let max_day = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(year) => 29,
            2 => 28,
            _ => return Err(DatetimeError::Month),
        };
        if day < 1 || day > max_day {
            return Err(DatetimeError::Day);
        }
        if hour > 23 {
            return Err(DatetimeError::Hour);
        }
        if minute > 59 {
            return Err(DatetimeError::Minute);
        }
        if second > 59 {
            return Err(DatetimeError::Second);
        }
        Ok(Datetime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Converts seconds since 1970-01-01 00:00:00 UTC to a calendar date-time.
    pub fn from_unix(unix_secs: u64) -> Self {
        let days_since_epoch = (unix_secs / SECONDS_PER_DAY) as i32;
        let secs_today = unix_secs % SECONDS_PER_DAY;

        let (year, month, day) = civil_from_days(days_since_epoch);

        Datetime {
            year,
            month,
            day,
            hour: (secs_today / 3600) as u8,
            minute: ((secs_today % 3600) / 60) as u8,
            second: (secs_today % 60) as u8,
        }
    }

    /// Converts to seconds since 1970-01-01 00:00:00 UTC.
    pub fn to_unix(&self) -> u64 {
        let days_since_epoch = days_from_civil(self.year, self.month, self.day);

        (days_since_epoch as u64) * SECONDS_PER_DAY
            + (self.hour as u64) * 3600
            + (self.minute as u64) * 60
            + (self.second as u64)
    }

    /// Year (1970..).
    pub const fn year(&self) -> u16 {
        self.year
    }
    /// Month (1-12).
    pub const fn month(&self) -> u8 {
        self.month
    }
    /// Day of month (1-31).
    pub const fn day(&self) -> u8 {
        self.day
    }
    /// Hour (0-23).
    pub const fn hour(&self) -> u8 {
        self.hour
    }
    /// Minute (0-59).
    pub const fn minute(&self) -> u8 {
        self.minute
    }
    /// Second (0-59).
    pub const fn second(&self) -> u8 {
        self.second
    }
}

/// Gregorian leap-year check: divisible by 4, except centuries, except
/// every fourth century.
fn is_leap_year(year: u16) -> bool {
    (year.is_multiple_of(4) && !year.is_multiple_of(100)) || year.is_multiple_of(400)
}

/// Days since the Unix epoch to civil date (year, month, day).
///
/// Howard Hinnant's civil_from_days, O(1).
fn civil_from_days(days_since_epoch: i32) -> (u16, u8, u8) {
    // Shift the epoch to 0000-03-01 so the leap day falls at year end
    let z = days_since_epoch + 719_468; // days from 0000-03-01 to 1970-01-01

    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u32; // day of era [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // year of era [0, 399]
    let y = (yoe as i32) + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year [0, 365]
    let mp = (5 * doy + 2) / 153; // month, March-based [0, 11]
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = if m <= 2 { y + 1 } else { y };

    (year as u16, m, d)
}

/// Civil date (year, month, day) to days since the Unix epoch.
///
/// Howard Hinnant's days_from_civil, O(1).
fn days_from_civil(year: u16, month: u8, day: u8) -> i32 {
    let y = year as i32;
    let m = month as i32;
    let d = day as i32;

    // March-based year: January and February belong to the previous year
    let (y, m) = if m <= 2 { (y - 1, m + 9) } else { (y, m - 3) };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32; // year of era [0, 399]
    let doy = (153 * (m as u32) + 2) / 5 + (d as u32) - 1; // day of year [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // day of era [0, 146096]

    era * 146_097 + (doe as i32) - 719_468
}
