//! Remote time authority contract
//!
//! The firmware treats the network time exchange as a black-box call: one
//! request, one bounded wait, one classified result. Implementations own
//! their transport (UDP/SNTP on real hardware) and must enforce their stated
//! timeout internally, so a caller can never hang on a fetch.

#![deny(unsafe_code)]

/// A remote authority that can report the current time.
///
/// Safe to call repeatedly; each call is independent. The returned value is
/// whole seconds since the Unix epoch, already in UTC.
pub trait TimeService {
    /// Performs one bounded time exchange.
    async fn fetch_unix_time(&mut self) -> Result<u64, TimeServiceError>;
}

/// Why a time exchange produced no usable time.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeServiceError {
    /// No response within the service's configured timeout.
    Timeout,
    /// The service could not be reached at all (no route, no address,
    /// send failure).
    Unreachable,
    /// A response arrived but did not contain a plausible time.
    BadResponse,
}

impl core::fmt::Display for TimeServiceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimeServiceError::Timeout => write!(f, "time service timed out"),
            TimeServiceError::Unreachable => write!(f, "time service unreachable"),
            TimeServiceError::BadResponse => write!(f, "time service sent a bad response"),
        }
    }
}

impl core::error::Error for TimeServiceError {}
