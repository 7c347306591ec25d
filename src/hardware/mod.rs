pub mod hd44780;
pub mod oled_grid;
pub mod pcf8583;
pub mod status_led;
pub mod traits;

pub use hd44780::Hd44780;
pub use oled_grid::OledGrid;
pub use pcf8583::Pcf8583;
pub use status_led::StatusLed;
