//! Packed binary-coded decimal
//!
//! One decimal digit per nibble, tens in the high nibble. The PCF8583 stores every time field
//! this way.

/// Pack a decimal value (0-99) into BCD.
///
/// Values above 99 are a caller error; they trip a debug assertion and are truncated otherwise.
pub const fn to_bcd(value: u8) -> u8 {
    debug_assert!(value <= 99);
    ((value / 10) << 4) | (value % 10)
}

/// Unpack a BCD byte into its decimal value.
///
/// Defined for every byte. Nibbles above 9 are not rejected here, so `0xFF` gives 165; use
/// [`is_valid_bcd`] to tell real time from a bus fault.
pub const fn from_bcd(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

/// Both nibbles hold a decimal digit.
pub const fn is_valid_bcd(byte: u8) -> bool {
    (byte >> 4) <= 9 && (byte & 0x0F) <= 9
}

/// Split a decimal value into (tens, units).
pub const fn split_digits(value: u8) -> (u8, u8) {
    (value / 10, value % 10)
}
