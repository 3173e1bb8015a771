//! Bit-banged TM1637 driver for the two 4-digit 7-segment modules.
//!
//! The TM1637 speaks a two-wire protocol that looks like I2C but has no
//! address byte and clocks data LSB first, so it gets GPIO bit-banging
//! instead of a hardware peripheral. CLK is push-pull (only we drive it);
//! DIO is emulated open-drain so the chip can pull the ACK bit low.

#![deny(unsafe_code)]

use duoclock_hal::{DisplayError, QuadDisplay, BRIGHTNESS_MAX};
use embassy_rp::gpio::{Flex, Output, Pull};

const CMD_DATA_AUTO: u8 = 0x40;
const CMD_ADDRESS: u8 = 0xC0;
const CMD_DISPLAY_ON: u8 = 0x88;

/// Colon on the clock face is the high segment bit of the second digit.
const SEG_COLON: u8 = 0x80;

const BIT_DELAY_US: u32 = 10;

pub struct Tm1637<'d> {
    clk: Output<'d>,
    dio: Flex<'d>,
    brightness: u8,
}

impl<'d> Tm1637<'d> {
    pub fn new(clk: Output<'d>, mut dio: Flex<'d>) -> Self {
        dio.set_pull(Pull::Up);
        dio.set_as_input();
        Self {
            clk,
            dio,
            brightness: BRIGHTNESS_MAX,
        }
    }

    fn write_segments(&mut self, segments: [u8; 4]) -> Result<(), DisplayError> {
        self.burst(&[CMD_DATA_AUTO])?;
        self.burst(&[
            CMD_ADDRESS,
            segments[0],
            segments[1],
            segments[2],
            segments[3],
        ])?;
        self.burst(&[CMD_DISPLAY_ON | self.brightness])
    }

    /// One start/stop framed transaction. Always releases the bus, even
    /// when a byte goes unacknowledged.
    fn burst(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.start();
        let mut result = Ok(());
        for &byte in bytes {
            result = self.write_byte(byte);
            if result.is_err() {
                break;
            }
        }
        self.stop();
        result
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        for bit in 0..8 {
            self.clk.set_low();
            delay_bit();
            if byte >> bit & 1 == 1 {
                self.dio_release();
            } else {
                self.dio_low();
            }
            delay_bit();
            self.clk.set_high();
            delay_bit();
        }

        // Ninth clock: the chip acknowledges by holding DIO low
        self.clk.set_low();
        self.dio_release();
        delay_bit();
        self.clk.set_high();
        delay_bit();
        let acked = self.dio.is_low();
        self.clk.set_low();
        delay_bit();

        if acked {
            Ok(())
        } else {
            Err(DisplayError::NotResponding)
        }
    }

    fn start(&mut self) {
        // DIO falls while CLK is high
        self.dio_low();
        delay_bit();
        self.clk.set_low();
        delay_bit();
    }

    fn stop(&mut self) {
        self.dio_low();
        delay_bit();
        self.clk.set_high();
        delay_bit();
        self.dio_release();
        delay_bit();
    }

    fn dio_low(&mut self) {
        self.dio.set_low();
        self.dio.set_as_output();
    }

    fn dio_release(&mut self) {
        self.dio.set_as_input();
    }
}

impl QuadDisplay for Tm1637<'_> {
    fn show_text(&mut self, text: &[u8; 4]) -> Result<(), DisplayError> {
        self.write_segments(text.map(glyph))
    }

    fn show_pair(&mut self, left: u8, right: u8) -> Result<(), DisplayError> {
        let left = left.min(99);
        let right = right.min(99);
        let mut segments = [
            digit(left / 10),
            digit(left % 10),
            digit(right / 10),
            digit(right % 10),
        ];
        segments[1] |= SEG_COLON;
        self.write_segments(segments)
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        self.brightness = level.min(BRIGHTNESS_MAX);
        self.burst(&[CMD_DISPLAY_ON | self.brightness])
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.write_segments([0; 4])
    }
}

fn digit(value: u8) -> u8 {
    glyph(b'0' + value)
}

/// Segment patterns for the characters the clock actually renders.
/// Anything else comes out blank.
fn glyph(c: u8) -> u8 {
    match c {
        b'0' => 0x3F,
        b'1' => 0x06,
        b'2' => 0x5B,
        b'3' => 0x4F,
        b'4' => 0x66,
        b'5' => 0x6D,
        b'6' => 0x7D,
        b'7' => 0x07,
        b'8' => 0x7F,
        b'9' => 0x6F,
        b'B' => 0x7C,
        b'C' => 0x39,
        b'E' => 0x79,
        b'F' => 0x71,
        b'G' => 0x3D,
        b'I' => 0x06,
        b'N' => 0x54,
        b'O' => 0x3F,
        b'P' => 0x73,
        b'R' => 0x50,
        b'S' => 0x6D,
        b'T' => 0x78,
        b'U' => 0x3E,
        b'W' => 0x2A,
        b'Y' => 0x6E,
        b'-' => 0x40,
        _ => 0x00,
    }
}

/// Busy-wait one protocol delay. clk_sys runs at the default 125 MHz.
fn delay_bit() {
    cortex_m::asm::delay(BIT_DELAY_US * 125);
}
