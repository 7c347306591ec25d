//! HD44780 character LCD, 4-bit parallel interface
//! =============================================================================================
//!
//! Only D4-D7 are wired. Every byte goes out as two nibbles, high nibble first, each latched on
//! the falling edge of E. RS selects between the instruction register (low) and data (high).
//!
//! Hardware Connections (20x4 module):
//!      RS   -> GPIO
//!      E    -> GPIO
//!      D4-7 -> GPIO
//!      R/W  -> GND (write only, so busy flag polling is replaced by fixed delays)

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::traits::CharDisplay;

/// Instruction set
pub mod commands {
    pub const CLEAR: u8 = 0x01;
    /// Entry mode: cursor moves right, no display shift
    pub const ENTRY_INCREMENT: u8 = 0x06;
    pub const DISPLAY_OFF: u8 = 0x08;
    /// Display on, cursor and blink off
    pub const DISPLAY_ON: u8 = 0x0C;
    /// Function set: 4-bit bus, 2 line addressing, 5x8 font
    pub const FUNCTION_4BIT_2LINE: u8 = 0x28;
    pub const SET_DDRAM_ADDRESS: u8 = 0x80;
}

/// Command execution time for everything except clear.
const COMMAND_US: u32 = 50;
/// Clear takes much longer.
const CLEAR_US: u32 = 2_000;

pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
}

impl<P, D> Hd44780<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// # Arguments
    /// - `rs`, `en`: register select and enable pins
    /// - `data`: D4, D5, D6, D7
    /// - `delay`: used for the controller's execution times
    pub fn new(rs: P, en: P, data: [P; 4], delay: D) -> Self {
        Self {
            rs,
            en,
            data,
            delay,
        }
    }

    /// Power-on initialisation by instruction.
    ///
    /// The controller may start in 8-bit mode or half way through a 4-bit byte, so it is forced
    /// into 8-bit mode three times before switching to 4-bit.
    pub fn init(&mut self) -> Result<(), P::Error> {
        self.rs.set_low()?;
        self.en.set_low()?;
        self.delay.delay_ms(40);

        self.write_nibble(0x3)?;
        self.delay.delay_us(4_100);
        self.write_nibble(0x3)?;
        self.delay.delay_us(150);
        self.write_nibble(0x3)?;
        self.delay.delay_us(150);
        self.write_nibble(0x2)?;
        self.delay.delay_us(150);

        self.command(commands::FUNCTION_4BIT_2LINE)?;
        self.command(commands::DISPLAY_OFF)?;
        self.clear()?;
        self.command(commands::ENTRY_INCREMENT)?;
        self.command(commands::DISPLAY_ON)
    }

    /// Blank the display and home the cursor.
    pub fn clear(&mut self) -> Result<(), P::Error> {
        self.command(commands::CLEAR)?;
        self.delay.delay_us(CLEAR_US);
        Ok(())
    }

    pub fn command(&mut self, command: u8) -> Result<(), P::Error> {
        self.write_byte(false, command)
    }

    /// Return the pins and the delay.
    pub fn release(self) -> (P, P, [P; 4], D) {
        (self.rs, self.en, self.data, self.delay)
    }

    fn write_byte(&mut self, data: bool, byte: u8) -> Result<(), P::Error> {
        if data {
            self.rs.set_high()?;
        } else {
            self.rs.set_low()?;
        }
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)?;
        self.delay.delay_us(COMMAND_US);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), P::Error> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << bit) != 0 {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }

        // E pulse, latched on the falling edge
        self.en.set_high()?;
        self.delay.delay_us(1);
        self.en.set_low()?;
        self.delay.delay_us(1);
        Ok(())
    }
}

impl<P, D> CharDisplay for Hd44780<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    type Error = P::Error;

    fn set_cursor(&mut self, address: u8) -> Result<(), Self::Error> {
        self.command(commands::SET_DDRAM_ADDRESS | (address & 0x7F))
    }

    fn write_char(&mut self, code: u8) -> Result<(), Self::Error> {
        self.write_byte(true, code)
    }
}
