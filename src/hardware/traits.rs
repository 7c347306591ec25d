/// Indicator LED.
pub trait Led {
    type Error;

    fn on(&mut self) -> Result<(), Self::Error>;
    fn off(&mut self) -> Result<(), Self::Error>;
    fn toggle(&mut self) -> Result<(), Self::Error>;
}

/// Cursor-addressed character display.
///
/// Addresses follow the HD44780 DDRAM scheme described by [`Geometry`]. Writing a character
/// moves the cursor one cell to the right.
pub trait CharDisplay {
    type Error;

    /// Move the write cursor to an absolute display address.
    fn set_cursor(&mut self, address: u8) -> Result<(), Self::Error>;

    /// Write one character code at the cursor and advance it.
    fn write_char(&mut self, code: u8) -> Result<(), Self::Error>;

    /// Push buffered output to the screen.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: CharDisplay + ?Sized> CharDisplay for &mut T {
    type Error = T::Error;

    fn set_cursor(&mut self, address: u8) -> Result<(), Self::Error> {
        T::set_cursor(self, address)
    }

    fn write_char(&mut self, code: u8) -> Result<(), Self::Error> {
        T::write_char(self, code)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

/// Rows and columns of a character display and where each row starts in DDRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub columns: u8,
    pub row_offsets: &'static [u8],
}

impl Geometry {
    /// 20x4 module: rows 2 and 3 continue rows 0 and 1 in memory.
    pub const LCD_20X4: Geometry = Geometry {
        columns: 20,
        row_offsets: &[0x00, 0x40, 0x14, 0x54],
    };

    pub const fn rows(&self) -> u8 {
        self.row_offsets.len() as u8
    }

    /// Display address of a (row, column) cell.
    pub fn address(&self, row: u8, column: u8) -> Option<u8> {
        if column >= self.columns {
            return None;
        }
        self.row_offsets
            .get(usize::from(row))
            .map(|offset| offset + column)
    }

    /// (row, column) of a display address, `None` for addresses off the glass.
    pub fn cell(&self, address: u8) -> Option<(u8, u8)> {
        self.row_offsets
            .iter()
            .position(|&offset| address >= offset && address - offset < self.columns)
            .map(|row| (row as u8, address - self.row_offsets[row]))
    }
}
