//! Physical inputs

#![deny(unsafe_code)]

/// The daylight-saving switch.
///
/// Read on every tick; flipping it must change the displayed hour on the
/// next render without a restart.
pub trait DstInput {
    /// True while daylight-saving time is selected.
    fn is_active(&mut self) -> bool;
}
