//! Where each field lands on the display.
//!
//! ```txt
//!  col  0 1 2 3 4 5 6 7 8 9 A B C D E F 0 1 2 3
//!  row0 D D / M M / Y Y         h h : m m : s s
//! ```

/// A rendered two-digit field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Date,
    Month,
    Year,
    Hours,
    Minutes,
    Seconds,
}

/// First (tens) digit address of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCell {
    pub field: Field,
    pub address: u8,
}

/// A fixed glyph that never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator {
    pub address: u8,
    pub glyph: u8,
}

/// Static display cell map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub fields: &'static [FieldCell],
    pub separators: &'static [Separator],
}

/// Date on the left, time on the right of the top row of a 20x4 display.
pub const LCD_20X4: Layout = Layout {
    fields: &[
        FieldCell { field: Field::Date, address: 0x00 },
        FieldCell { field: Field::Month, address: 0x03 },
        FieldCell { field: Field::Year, address: 0x06 },
        FieldCell { field: Field::Hours, address: 0x0C },
        FieldCell { field: Field::Minutes, address: 0x0F },
        FieldCell { field: Field::Seconds, address: 0x12 },
    ],
    separators: &[
        Separator { address: 0x02, glyph: b'/' },
        Separator { address: 0x05, glyph: b'/' },
        Separator { address: 0x0E, glyph: b':' },
        Separator { address: 0x11, glyph: b':' },
    ],
};

impl Layout {
    pub fn address_of(&self, field: Field) -> Option<u8> {
        self.fields
            .iter()
            .find(|cell| cell.field == field)
            .map(|cell| cell.address)
    }
}
