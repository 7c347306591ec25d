//! NXP PCF8583 clock/calendar driver
//! =============================================================================================
//!
//! The PCF8583 keeps time in battery-backed BCD registers behind a two-wire bus. Every access is
//! a single-register transaction:
//!
//! ```txt
//! write:  S | 0xA0 | reg | data | P
//! read:   S | 0xA0 | reg | Sr | 0xA1 | data | P
//! ```
//!
//! `0xA0`/`0xA1` are the write/read slave bytes with the A0 pin tied low. embedded-hal takes the
//! 7-bit address and adds the R/W bit itself, so the driver talks to [`ADDRESS`].
//!
//! Counting must be halted while the time is written, otherwise the chip may roll a field over
//! between two writes and leave an inconsistent time behind.

use embedded_hal::i2c::{ErrorKind, I2c};

use crate::bcd;
use crate::time::{DateTime, PackedDateYear, PackedWeekdayMonth};

/// Slave byte for the write phase (A0 pin low).
pub const WRITE_ADDRESS: u8 = 0xA0;
/// Slave byte for the read phase.
pub const READ_ADDRESS: u8 = WRITE_ADDRESS | 1;
/// 7-bit bus address.
pub const ADDRESS: u8 = WRITE_ADDRESS >> 1;

/// Transaction attempts after the first one before a bus error is reported.
pub const DEFAULT_RETRIES: u8 = 2;

/// Register offsets
pub mod registers {
    pub const CONTROL_STATUS: u8 = 0x00;
    pub const HUNDREDTHS: u8 = 0x01;
    pub const SECONDS: u8 = 0x02;
    pub const MINUTES: u8 = 0x03;
    pub const HOURS: u8 = 0x04;
    pub const YEAR_DATE: u8 = 0x05;
    pub const WEEKDAY_MONTH: u8 = 0x06;
}

/// Register bits
pub mod bits {
    /// CONTROL_STATUS: stop counting
    pub const HALT: u8 = 0x80;
    /// HOURS: 12 hour format
    pub const HOUR_12H: u8 = 0x80;
    /// HOURS: PM flag (12 hour format only)
    pub const HOUR_PM: u8 = 0x40;
    /// HOURS: BCD hours in 12 hour format
    pub const HOUR_12H_MASK: u8 = 0x1F;
    /// HOURS: BCD hours in 24 hour format
    pub const HOUR_24H_MASK: u8 = 0x3F;
}

/// PCF8583 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// A transaction kept failing after every retry
    Bus { register: u8, source: E },
    /// A register holds a nibble above 9
    InvalidBcd { register: u8, value: u8 },
    /// A field decoded to something that is not a time or date
    OutOfRange { register: u8, value: u8 },
    /// The year does not fit the chip's four year counter
    YearOutOfWindow { year: i32 },
    /// Chip year 0 counts as a leap year, so the base year must be one too
    BaseYearNotLeap { base_year: u16 },
}

fn kind_str(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Bus => "bus error",
        ErrorKind::ArbitrationLoss => "arbitration lost",
        ErrorKind::NoAcknowledge(_) => "no acknowledge",
        ErrorKind::Overrun => "overrun",
        _ => "other",
    }
}

impl<E: embedded_hal::i2c::Error> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus { register, source } => {
                write!(f, "register {register:#04x}: {}", kind_str(source.kind()))
            }
            Error::InvalidBcd { register, value } => {
                write!(f, "register {register:#04x}: invalid BCD {value:#04x}")
            }
            Error::OutOfRange { register, value } => {
                write!(f, "register {register:#04x}: {value} out of range")
            }
            Error::YearOutOfWindow { year } => write!(f, "year {year} outside the chip window"),
            Error::BaseYearNotLeap { base_year } => {
                write!(f, "base year {base_year} is not a leap year")
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: embedded_hal::i2c::Error> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Bus { register, source } => {
                defmt::write!(f, "register {=u8:#x}: {=str}", register, kind_str(source.kind()))
            }
            Error::InvalidBcd { register, value } => {
                defmt::write!(f, "register {=u8:#x}: invalid BCD {=u8:#x}", register, value)
            }
            Error::OutOfRange { register, value } => {
                defmt::write!(f, "register {=u8:#x}: {=u8} out of range", register, value)
            }
            Error::YearOutOfWindow { year } => {
                defmt::write!(f, "year {=i32} outside the chip window", year)
            }
            Error::BaseYearNotLeap { base_year } => {
                defmt::write!(f, "base year {=u16} is not a leap year", base_year)
            }
        }
    }
}

/// PCF8583 real-time clock on an I2C bus
pub struct Pcf8583<I2C> {
    i2c: I2C,
    address: u8,
    retries: u8,
}

impl<I2C, E> Pcf8583<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Driver for a chip with its A0 pin tied low.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, ADDRESS)
    }

    /// Driver for a chip at another 7-bit address (`0x51` with A0 high).
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Set how many times a failed transaction is repeated.
    pub fn set_retries(&mut self, retries: u8) {
        self.retries = retries;
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Run one transaction, repeating it on failure up to the retry limit.
    fn transact<T>(
        &mut self,
        register: u8,
        mut op: impl FnMut(&mut I2C, u8) -> Result<T, E>,
    ) -> Result<T, Error<E>> {
        let mut attempt = 0;
        loop {
            match op(&mut self.i2c, self.address) {
                Ok(value) => return Ok(value),
                Err(source) if attempt >= self.retries => {
                    return Err(Error::Bus { register, source });
                }
                Err(_) => {
                    attempt += 1;
                    debug!("pcf8583: retry {=u8} on register {=u8:#x}", attempt, register);
                }
            }
        }
    }

    /// Write one register.
    ///
    /// # Arguments
    /// - `register`: register offset, see [`registers`]
    /// - `value`: raw register contents
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<E>> {
        self.transact(register, |i2c, address| i2c.write(address, &[register, value]))
    }

    /// Read one register.
    ///
    /// The register offset is written first, then a repeated start switches the bus to reading.
    pub fn read_register(&mut self, register: u8) -> Result<u8, Error<E>> {
        self.transact(register, |i2c, address| {
            let mut buf = [0u8; 1];
            i2c.write_read(address, &[register], &mut buf)?;
            Ok(buf[0])
        })
    }

    /// Stop the clock from counting.
    pub fn halt(&mut self) -> Result<(), Error<E>> {
        self.write_register(registers::CONTROL_STATUS, bits::HALT)
    }

    /// Let the clock count again.
    pub fn resume(&mut self) -> Result<(), Error<E>> {
        self.write_register(registers::CONTROL_STATUS, 0x00)
    }

    pub fn is_halted(&mut self) -> Result<bool, Error<E>> {
        Ok(self.read_register(registers::CONTROL_STATUS)? & bits::HALT != 0)
    }

    /// Load a new time and date.
    ///
    /// The clock is halted for the whole update and only restarted once every field is written.
    /// If a write fails the clock stays halted and the error is returned.
    pub fn set_datetime(&mut self, dt: &DateTime) -> Result<(), Error<E>> {
        check_range(registers::SECONDS, dt.second, 0..=59)?;
        check_range(registers::MINUTES, dt.minute, 0..=59)?;
        check_range(registers::HOURS, dt.hour, 0..=23)?;
        check_range(registers::YEAR_DATE, dt.year, 0..=3)?;
        check_range(registers::WEEKDAY_MONTH, dt.month, 1..=12)?;
        check_range(
            registers::YEAR_DATE,
            dt.date,
            1..=days_in_month(dt.month, dt.year),
        )?;
        check_range(registers::WEEKDAY_MONTH, dt.weekday, 0..=6)?;

        self.halt()?;

        self.write_register(registers::HUNDREDTHS, 0x00)?;
        self.write_register(registers::SECONDS, bcd::to_bcd(dt.second))?;
        self.write_register(registers::MINUTES, bcd::to_bcd(dt.minute))?;
        // 24 hour format
        self.write_register(registers::HOURS, bcd::to_bcd(dt.hour))?;
        self.write_register(
            registers::YEAR_DATE,
            PackedDateYear::new(dt.date, dt.year).0,
        )?;
        self.write_register(
            registers::WEEKDAY_MONTH,
            PackedWeekdayMonth::new(dt.month, dt.weekday).0,
        )?;

        self.resume()
    }

    /// Read the current time and date.
    ///
    /// Every field is read fresh; any failed or invalid register fails the whole reading. If the
    /// seconds wrapped while the other fields were read, the whole set is read again.
    pub fn read_datetime(&mut self) -> Result<DateTime, Error<E>> {
        let mut raw = self.read_fields()?;
        if self.read_register(registers::SECONDS)? < raw[0] {
            debug!("pcf8583: minute rolled over during read, reading again");
            raw = self.read_fields()?;
        }

        let [seconds, minutes, hours, year_date, weekday_month] = raw;
        let year_date = PackedDateYear(year_date);
        let weekday_month = PackedWeekdayMonth(weekday_month);

        trace!(
            "pcf8583: raw {=u8:#x} {=u8:#x} {=u8:#x} {=u8:#x} {=u8:#x}",
            seconds,
            minutes,
            hours,
            year_date.0,
            weekday_month.0
        );

        let year = year_date.year();
        let month = decode_field(registers::WEEKDAY_MONTH, weekday_month.month_bcd(), 1..=12)?;
        Ok(DateTime {
            second: decode_field(registers::SECONDS, seconds, 0..=59)?,
            minute: decode_field(registers::MINUTES, minutes, 0..=59)?,
            hour: decode_hours(hours)?,
            date: decode_field(
                registers::YEAR_DATE,
                year_date.date_bcd(),
                1..=days_in_month(month, year),
            )?,
            month,
            weekday: check_range(registers::WEEKDAY_MONTH, weekday_month.weekday(), 0..=6)?,
            year,
        })
    }

    /// Seconds, minutes, hours, year/date and weekday/month, one register at a time.
    fn read_fields(&mut self) -> Result<[u8; 5], Error<E>> {
        Ok([
            self.read_register(registers::SECONDS)?,
            self.read_register(registers::MINUTES)?,
            self.read_register(registers::HOURS)?,
            self.read_register(registers::YEAR_DATE)?,
            self.read_register(registers::WEEKDAY_MONTH)?,
        ])
    }
}

/// Length of a month as the chip counts it: February has 29 days in year 0 only.
fn days_in_month(month: u8, year: u8) -> u8 {
    match month {
        2 if year == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn check_range<E>(
    register: u8,
    value: u8,
    range: core::ops::RangeInclusive<u8>,
) -> Result<u8, Error<E>> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(Error::OutOfRange { register, value })
    }
}

fn decode_field<E>(
    register: u8,
    raw: u8,
    range: core::ops::RangeInclusive<u8>,
) -> Result<u8, Error<E>> {
    if !bcd::is_valid_bcd(raw) {
        return Err(Error::InvalidBcd {
            register,
            value: raw,
        });
    }
    check_range(register, bcd::from_bcd(raw), range)
}

/// Decode the hours register into 0-23, whichever format the chip is counting in.
fn decode_hours<E>(raw: u8) -> Result<u8, Error<E>> {
    if raw & bits::HOUR_12H == 0 {
        return decode_field(registers::HOURS, raw & bits::HOUR_24H_MASK, 0..=23);
    }

    let hour = decode_field(registers::HOURS, raw & bits::HOUR_12H_MASK, 1..=12)?;
    let pm = raw & bits::HOUR_PM != 0;

    Ok(match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (hour, false) => hour,
        (hour, true) => hour + 12,
    })
}
