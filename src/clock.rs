//! Time render pipeline
//! =============================================================================================
//!
//! ```txt
//!   Init ──> Seed ──> PollCycle ─┐
//!                        ^       │
//!                        └───────┘
//! ```
//!
//! - Init: done by the firmware before a [`Clock`] exists (clocks, pins, bus, display).
//! - Seed: load the configured start time into the PCF8583, once.
//! - PollCycle: read every field, decode, draw the digits and separators, wait, repeat.
//!
//! Each cycle works on a fresh reading. If the reading fails (bus fault after all retries, or
//! bytes that are not valid BCD) every field is drawn as `--` instead of stale or garbled digits.

use core::ops::ControlFlow;

use chrono::Datelike;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, I2c};

use crate::bcd;
use crate::config::Config;
use crate::hardware::pcf8583::{Error, Pcf8583, registers};
use crate::hardware::traits::CharDisplay;
use crate::layout::Field;
use crate::time::DateTime;

/// What one poll cycle put on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    /// A valid reading was drawn
    Time(DateTime),
    /// The clock could not be read; fault glyphs were drawn
    Fault,
}

/// Owns the clock chip and the display for the lifetime of the firmware.
pub struct Clock<I2C, DISP> {
    rtc: Pcf8583<I2C>,
    display: DISP,
    config: Config,
    seeded: bool,
    cycles: u32,
}

impl<I2C, E, DISP> Clock<I2C, DISP>
where
    I2C: I2c<Error = E>,
    E: i2c::Error,
    DISP: CharDisplay,
{
    /// # Arguments
    /// - `rtc`: clock driver on an initialised bus
    /// - `display`: initialised character display
    /// - `config`: cadence, retries, seed and layout
    pub fn new(mut rtc: Pcf8583<I2C>, display: DISP, config: Config) -> Self {
        rtc.set_retries(config.max_retries);
        Self {
            rtc,
            display,
            config,
            seeded: false,
            cycles: 0,
        }
    }

    /// Completed poll cycles.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn display_mut(&mut self) -> &mut DISP {
        &mut self.display
    }

    pub fn release(self) -> (Pcf8583<I2C>, DISP) {
        (self.rtc, self.display)
    }

    /// Load the configured start time into the chip.
    ///
    /// Runs once; later calls return `Ok(false)` without touching the bus. A failed seed can be
    /// retried. The base year must be a leap year, as the chip treats its year 0 as one.
    pub fn seed(&mut self) -> Result<bool, Error<E>> {
        if self.seeded {
            return Ok(false);
        }

        if !self.config.base_year_is_leap() {
            return Err(Error::BaseYearNotLeap {
                base_year: self.config.base_year,
            });
        }

        let start = self
            .config
            .seed_datetime()
            .ok_or(Error::YearOutOfWindow {
                year: self.config.seed.year(),
            })?;

        info!(
            "seeding clock with {=str} {=str}",
            start.date_string(self.config.base_year).as_str(),
            start.time_string().as_str()
        );

        self.rtc.set_datetime(&start)?;
        self.seeded = true;
        Ok(true)
    }

    /// Read the clock once and draw it.
    ///
    /// Bus faults do not fail the cycle, they are drawn. Only display errors are returned.
    pub fn poll_cycle(&mut self) -> Result<Frame, DISP::Error> {
        let base_year = self.config.base_year;
        let reading = self.rtc.read_datetime().and_then(|now| match now.to_naive(base_year) {
            Some(_) => Ok(now),
            None => Err(Error::OutOfRange {
                register: registers::YEAR_DATE,
                value: now.date,
            }),
        });

        let frame = match reading {
            Ok(now) => {
                info!(
                    "secs {=u8} mins {=u8} hours {=u8} date {=u8} month {=u8} year {=u8}",
                    now.second,
                    now.minute,
                    now.hour,
                    now.date,
                    now.month,
                    now.year
                );
                self.render_time(&now)?;
                Frame::Time(now)
            }
            Err(err) => {
                warn!("clock read failed: {}", err);
                self.render_fault()?;
                Frame::Fault
            }
        };

        self.render_separators()?;
        self.display.flush()?;
        self.cycles = self.cycles.wrapping_add(1);

        Ok(frame)
    }

    /// Poll forever, pausing `poll_period_ms` between cycles.
    ///
    /// `on_frame` sees every frame; returning `ControlFlow::Break` ends the loop and gives back
    /// the number of cycles run. The firmware never breaks.
    pub fn run<D: DelayNs>(
        &mut self,
        delay: &mut D,
        mut on_frame: impl FnMut(&Frame) -> ControlFlow<()>,
    ) -> Result<u32, DISP::Error> {
        let mut cycles = 0;
        loop {
            let frame = self.poll_cycle()?;
            cycles += 1;

            if on_frame(&frame).is_break() {
                debug!("clock loop stopped after {=u32} cycles", cycles);
                return Ok(cycles);
            }

            delay.delay_ms(self.config.poll_period_ms);
        }
    }

    fn render_time(&mut self, now: &DateTime) -> Result<(), DISP::Error> {
        for cell in self.config.layout.fields {
            let value = match cell.field {
                Field::Date => now.date,
                Field::Month => now.month,
                Field::Year => now.two_digit_year(self.config.base_year),
                Field::Hours => now.hour,
                Field::Minutes => now.minute,
                Field::Seconds => now.second,
            };

            let (tens, units) = bcd::split_digits(value);
            self.display.set_cursor(cell.address)?;
            self.display.write_char(b'0' + tens)?;
            self.display.write_char(b'0' + units)?;
        }
        Ok(())
    }

    fn render_fault(&mut self) -> Result<(), DISP::Error> {
        for cell in self.config.layout.fields {
            self.display.set_cursor(cell.address)?;
            self.display.write_char(self.config.fault_glyph)?;
            self.display.write_char(self.config.fault_glyph)?;
        }
        Ok(())
    }

    fn render_separators(&mut self) -> Result<(), DISP::Error> {
        for sep in self.config.layout.separators {
            self.display.set_cursor(sep.address)?;
            self.display.write_char(sep.glyph)?;
        }
        Ok(())
    }
}
