//! Host-side date/time and the PCF8583 shared-register views.
//!
//! The chip packs two fields into each of its date registers:
//!
//! ```txt
//!  YEAR_DATE      | 7 6 | 5 4 3 2 1 0 |
//!                 | year|  date (BCD) |
//!
//!  WEEKDAY_MONTH  | 7 6 5 | 4 3 2 1 0 |
//!                 |weekday| month(BCD)|
//! ```
//!
//! The year is a plain 0-3 counter (the chip only tracks leap years), the weekday a plain 0-6
//! counter. Both are binary, not BCD.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use core::fmt::Write;
use heapless::String;

use crate::bcd;

/// Mask of the BCD date in `YEAR_DATE`.
pub const DATE_MASK: u8 = 0x3F;
/// Position of the year counter in `YEAR_DATE`.
pub const YEAR_SHIFT: u8 = 6;
/// Mask of the BCD month in `WEEKDAY_MONTH`.
pub const MONTH_MASK: u8 = 0x1F;
/// Position of the weekday counter in `WEEKDAY_MONTH`.
pub const WEEKDAY_SHIFT: u8 = 5;

/// Years the chip's 2-bit counter can hold before wrapping.
pub const YEAR_WINDOW: u16 = 4;

/// `YEAR_DATE` register contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PackedDateYear(pub u8);

impl PackedDateYear {
    pub const fn new(date: u8, year: u8) -> Self {
        Self(((year & 0x03) << YEAR_SHIFT) | (bcd::to_bcd(date) & DATE_MASK))
    }

    /// Date nibbles, still BCD.
    pub const fn date_bcd(self) -> u8 {
        self.0 & DATE_MASK
    }

    pub const fn date(self) -> u8 {
        bcd::from_bcd(self.date_bcd())
    }

    pub const fn year(self) -> u8 {
        (self.0 >> YEAR_SHIFT) & 0x03
    }
}

/// `WEEKDAY_MONTH` register contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PackedWeekdayMonth(pub u8);

impl PackedWeekdayMonth {
    pub const fn new(month: u8, weekday: u8) -> Self {
        Self(((weekday & 0x07) << WEEKDAY_SHIFT) | (bcd::to_bcd(month) & MONTH_MASK))
    }

    /// Month nibbles, still BCD.
    pub const fn month_bcd(self) -> u8 {
        self.0 & MONTH_MASK
    }

    pub const fn month(self) -> u8 {
        bcd::from_bcd(self.month_bcd())
    }

    pub const fn weekday(self) -> u8 {
        self.0 >> WEEKDAY_SHIFT
    }
}

/// One reading of the clock, decoded to plain integers.
///
/// Hours are always 24h. `year` is the chip's 0-3 counter; the calendar year is
/// `base_year + year` for the configured base year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub date: u8,
    pub month: u8,
    /// Days since Monday (0-6)
    pub weekday: u8,
    pub year: u8,
}

impl DateTime {
    /// Convert a calendar time into chip fields.
    ///
    /// Returns `None` when the year is outside `base_year..base_year + 4`.
    pub fn from_naive(now: &NaiveDateTime, base_year: u16) -> Option<Self> {
        let offset = now.year() - i32::from(base_year);
        if !(0..i32::from(YEAR_WINDOW)).contains(&offset) {
            return None;
        }

        Some(Self {
            second: now.second() as u8,
            minute: now.minute() as u8,
            hour: now.hour() as u8,
            date: now.day() as u8,
            month: now.month() as u8,
            weekday: now.weekday().num_days_from_monday() as u8,
            year: offset as u8,
        })
    }

    /// Calendar time for this reading, or `None` if the fields do not form a real date.
    pub fn to_naive(&self, base_year: u16) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(base_year) + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.date),
        )?
        .and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
    }

    /// Last two digits of the calendar year.
    pub const fn two_digit_year(&self, base_year: u16) -> u8 {
        ((base_year + self.year as u16) % 100) as u8
    }

    /// `HH:MM:SS`
    pub fn time_string(&self) -> String<8> {
        let mut buf = String::new();
        // 8 bytes always fit
        let _ = write!(buf, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
        buf
    }

    /// `DD/MM/YY`
    pub fn date_string(&self, base_year: u16) -> String<8> {
        let mut buf = String::new();
        let _ = write!(
            buf,
            "{:02}/{:02}/{:02}",
            self.date,
            self.month,
            self.two_digit_year(base_year)
        );
        buf
    }
}
