//! Daylight-saving lever on GP22.

#![deny(unsafe_code)]

use duoclock_hal::DstInput;
use embassy_rp::gpio::Input;

/// Physical switch wired between GP22 and ground.
///
/// The pin idles high through the internal pull-up, which selects summer
/// time; closing the switch grounds the pin back to the base offset.
pub struct DstSwitch<'d> {
    pin: Input<'d>,
}

impl<'d> DstSwitch<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }
}

impl DstInput for DstSwitch<'_> {
    fn is_active(&mut self) -> bool {
        self.pin.is_high()
    }
}
