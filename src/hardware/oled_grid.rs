//! Character grid on a monochrome graphics display
//!
//! Lays a 20x4 grid of `FONT_6X10` cells over a 128x64 panel and addresses it like an HD44780
//! DDRAM in 2-line mode, so the same cell map drives either display. The cursor advances the way
//! the LCD's does: past 0x27 it continues at 0x40, past 0x67 back at 0x00.

use embedded_graphics::{
    mono_font::{MonoTextStyle, MonoTextStyleBuilder, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use ssd1306::{
    Ssd1306,
    mode::BufferedGraphicsMode,
    prelude::{DisplaySize, WriteOnlyDataCommand},
};

use super::traits::{CharDisplay, Geometry};

/// Horizontal pixels per cell
pub const CELL_WIDTH: i32 = 6;
/// Vertical pixels per row
pub const ROW_PITCH: i32 = 16;
/// Centres 20 columns on a 128 pixel panel
pub const LEFT_MARGIN: i32 = 4;

/// Draw target that buffers and needs an explicit push to the panel.
pub trait Present: DrawTarget<Color = BinaryColor> {
    fn present(&mut self) -> Result<(), Self::Error>;
}

impl<DI, SIZE> Present for Ssd1306<DI, SIZE, BufferedGraphicsMode<SIZE>>
where
    DI: WriteOnlyDataCommand,
    SIZE: DisplaySize,
{
    fn present(&mut self) -> Result<(), Self::Error> {
        self.flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GridError<E> {
    /// The draw target failed
    Draw(E),
    /// Address has no cell on the grid
    Address(u8),
}

/// DDRAM address after `address`: two 40 character lines at 0x00 and 0x40.
fn next_address(address: u8) -> u8 {
    match address {
        0x27 => 0x40,
        0x67 => 0x00,
        other => other + 1,
    }
}

pub struct OledGrid<D> {
    target: D,
    geometry: Geometry,
    address: u8,
    style: MonoTextStyle<'static, BinaryColor>,
}

impl<D: Present> OledGrid<D> {
    pub fn new(target: D) -> Self {
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(BinaryColor::On)
            .background_color(BinaryColor::Off)
            .build();

        Self {
            target,
            geometry: Geometry::LCD_20X4,
            address: 0,
            style,
        }
    }

    pub fn release(self) -> D {
        self.target
    }

    /// Top-left pixel of a cell.
    pub fn origin(row: u8, column: u8) -> Point {
        Point::new(
            LEFT_MARGIN + i32::from(column) * CELL_WIDTH,
            i32::from(row) * ROW_PITCH,
        )
    }
}

impl<D: Present> CharDisplay for OledGrid<D> {
    type Error = GridError<D::Error>;

    fn set_cursor(&mut self, address: u8) -> Result<(), Self::Error> {
        if self.geometry.cell(address).is_none() {
            return Err(GridError::Address(address));
        }
        self.address = address;
        Ok(())
    }

    fn write_char(&mut self, code: u8) -> Result<(), Self::Error> {
        let (row, column) = self
            .geometry
            .cell(self.address)
            .ok_or(GridError::Address(self.address))?;

        // Font only covers printable ASCII
        let glyph = if code == b' ' || code.is_ascii_graphic() {
            [code]
        } else {
            [b'?']
        };
        let text = core::str::from_utf8(&glyph).unwrap_or("?");

        Text::with_baseline(text, Self::origin(row, column), self.style, Baseline::Top)
            .draw(&mut self.target)
            .map_err(GridError::Draw)?;

        self.address = next_address(self.address);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.target.present().map_err(GridError::Draw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    impl Present for MockDisplay<BinaryColor> {
        fn present(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn mock() -> MockDisplay<BinaryColor> {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        display.set_allow_out_of_bounds_drawing(true);
        display
    }

    fn draw(display: &mut MockDisplay<BinaryColor>, text: &str, row: u8, column: u8) {
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(BinaryColor::On)
            .background_color(BinaryColor::Off)
            .build();
        Text::with_baseline(
            text,
            OledGrid::<MockDisplay<BinaryColor>>::origin(row, column),
            style,
            Baseline::Top,
        )
        .draw(display)
        .unwrap();
    }

    fn expected(text: &str, row: u8, column: u8) -> MockDisplay<BinaryColor> {
        let mut display = mock();
        draw(&mut display, text, row, column);
        display
    }

    #[test]
    fn glyph_lands_in_its_cell() {
        let mut grid = OledGrid::new(mock());
        grid.set_cursor(0x01).unwrap();
        grid.write_char(b'7').unwrap();
        grid.flush().unwrap();
        assert_eq!(grid.release(), expected("7", 0, 1));
    }

    #[test]
    fn second_row_uses_ddram_offset() {
        let mut grid = OledGrid::new(mock());
        grid.set_cursor(0x42).unwrap();
        grid.write_char(b':').unwrap();
        assert_eq!(grid.release(), expected(":", 1, 2));
    }

    #[test]
    fn cursor_advances() {
        let mut grid = OledGrid::new(mock());
        grid.set_cursor(0x00).unwrap();
        grid.write_char(b'0').unwrap();
        grid.write_char(b'7').unwrap();
        assert_eq!(grid.release(), expected("07", 0, 0));
    }

    #[test]
    fn rewriting_a_cell_is_idempotent() {
        let mut grid = OledGrid::new(mock());
        for _ in 0..2 {
            grid.set_cursor(0x03).unwrap();
            grid.write_char(b'5').unwrap();
        }
        assert_eq!(grid.release(), expected("5", 0, 3));
    }

    #[test]
    fn off_grid_addresses_are_rejected() {
        let mut grid = OledGrid::new(mock());
        assert_eq!(grid.set_cursor(0x28), Err(GridError::Address(0x28)));
        assert_eq!(grid.set_cursor(0x68), Err(GridError::Address(0x68)));
    }

    #[test]
    fn cursor_wraps_like_ddram() {
        let mut grid = OledGrid::new(mock());
        // 0x27 is the last cell of row 2, the next write lands at 0x40 (row 1)
        grid.set_cursor(0x27).unwrap();
        grid.write_char(b'1').unwrap();
        grid.write_char(b'2').unwrap();

        let mut want = expected("1", 2, 19);
        draw(&mut want, "2", 1, 0);
        assert_eq!(grid.release(), want);

        assert_eq!(next_address(0x67), 0x00);
        assert_eq!(next_address(0x13), 0x14);
    }
}
