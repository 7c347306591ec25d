//! Runtime configuration
//!
//! Defaults reproduce the coop controller: a 980 ms poll period, the 20x4 layout and the clock
//! seeded to 12:08:30 on Saturday 4 January 2020.

use chrono::{NaiveDate, NaiveDateTime};

use crate::layout::{self, Layout};
use crate::time::DateTime;

/// Pause between two poll cycles. Together with the bus and display time this gives about one
/// refresh per second.
pub const DEFAULT_POLL_PERIOD_MS: u32 = 980;

/// First year of the chip's four year window.
pub const DEFAULT_BASE_YEAR: u16 = 2020;

/// Drawn in place of both digits of every field when the clock cannot be read.
pub const FAULT_GLYPH: u8 = b'-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Delay after each poll cycle
    pub poll_period_ms: u32,
    /// Extra attempts per register access before the cycle is marked faulty
    pub max_retries: u8,
    /// Calendar year of chip year 0. Must be a leap year, seeding refuses anything else.
    pub base_year: u16,
    /// Loaded into the clock once at start-up
    pub seed: NaiveDateTime,
    pub layout: Layout,
    pub fault_glyph: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_period_ms: DEFAULT_POLL_PERIOD_MS,
            max_retries: crate::hardware::pcf8583::DEFAULT_RETRIES,
            base_year: DEFAULT_BASE_YEAR,
            seed: NaiveDate::from_ymd_opt(2020, 1, 4)
                .and_then(|date| date.and_hms_opt(12, 8, 30))
                .unwrap_or_default(),
            layout: layout::LCD_20X4,
            fault_glyph: FAULT_GLYPH,
        }
    }
}

impl Config {
    /// Seed converted to chip fields, `None` if it is outside the base year window.
    pub fn seed_datetime(&self) -> Option<DateTime> {
        DateTime::from_naive(&self.seed, self.base_year)
    }

    /// The chip treats year 0 as a leap year; the calendar has to agree.
    pub fn base_year_is_leap(&self) -> bool {
        NaiveDate::from_ymd_opt(i32::from(self.base_year), 2, 29).is_some()
    }
}
