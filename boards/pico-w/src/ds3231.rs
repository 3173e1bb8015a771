//! DS3231 battery-backed RTC on I2C0 (GP16 SDA / GP17 SCL).

#![deny(unsafe_code)]

use defmt::warn;
use duoclock_hal::{BackupClock, BackupClockError, Datetime};
use embedded_hal_async::i2c::I2c;

const ADDR: u8 = 0x68;

const REG_SECONDS: u8 = 0x00;
const REG_STATUS: u8 = 0x0F;

/// Oscillator Stop Flag: set when the oscillator has been down since the
/// time was last written, meaning the stored time cannot be trusted.
const OSF: u8 = 0x80;

pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    async fn read_register(&mut self, reg: u8) -> Result<u8, BackupClockError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(ADDR, &[reg], &mut value)
            .await
            .map_err(|_| BackupClockError::Bus)?;
        Ok(value[0])
    }

    async fn clear_osf(&mut self) -> Result<(), BackupClockError> {
        let status = self.read_register(REG_STATUS).await?;
        if status & OSF != 0 {
            self.i2c
                .write(ADDR, &[REG_STATUS, status & !OSF])
                .await
                .map_err(|_| BackupClockError::Bus)?;
        }
        Ok(())
    }
}

impl<I2C: I2c> BackupClock for Ds3231<I2C> {
    async fn read(&mut self) -> Result<Datetime, BackupClockError> {
        let status = self.read_register(REG_STATUS).await?;
        if status & OSF != 0 {
            warn!("rtc oscillator stopped since last set, stored time untrusted");
            return Err(BackupClockError::Invalid);
        }

        let mut regs = [0u8; 7];
        self.i2c
            .write_read(ADDR, &[REG_SECONDS], &mut regs)
            .await
            .map_err(|_| BackupClockError::Bus)?;

        let second = bcd_decode(regs[0] & 0x7F);
        let minute = bcd_decode(regs[1] & 0x7F);
        let hour = bcd_decode(regs[2] & 0x3F);
        let day = bcd_decode(regs[4] & 0x3F);
        let month = bcd_decode(regs[5] & 0x1F);
        let year = 2000 + u16::from(bcd_decode(regs[6]));

        Datetime::new(year, month, day, hour, minute, second)
            .map_err(|_| BackupClockError::Invalid)
    }

    async fn write(&mut self, dt: &Datetime) -> Result<(), BackupClockError> {
        // The year register holds two digits against a fixed 2000 base
        let year = dt
            .year()
            .checked_sub(2000)
            .filter(|y| *y <= 99)
            .ok_or(BackupClockError::Invalid)?;

        // The chip wants a 1..=7 weekday; day zero of the unix epoch was
        // a Thursday
        let weekday = ((dt.to_unix() / 86_400 + 4) % 7 + 1) as u8;

        self.i2c
            .write(
                ADDR,
                &[
                    REG_SECONDS,
                    bcd_encode(dt.second()),
                    bcd_encode(dt.minute()),
                    bcd_encode(dt.hour()),
                    weekday,
                    bcd_encode(dt.day()),
                    bcd_encode(dt.month()),
                    bcd_encode(year as u8),
                ],
            )
            .await
            .map_err(|_| BackupClockError::Bus)?;

        // A freshly written time is trustworthy again
        self.clear_osf().await
    }
}

fn bcd_encode(value: u8) -> u8 {
    (value / 10) << 4 | (value % 10)
}

fn bcd_decode(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}
