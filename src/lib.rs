//! PCF8583 wall clock for the coop door controller
//! =============================================================================================
//!
//! Keeps time in an external PCF8583 real-time clock on the I2C bus and renders the date and
//! time onto a 20x4 character display every cycle.
//!
//! Layout:
//! - [`bcd`]: packed BCD conversion
//! - [`hardware`]: PCF8583 driver, character display back-ends, status LED
//! - [`time`]: host-side date/time and the packed register views
//! - [`layout`]: fixed display cell addresses
//! - [`clock`]: seed + poll/render pipeline
//! - [`config`]: runtime configuration

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod bcd;
pub mod clock;
pub mod config;
pub mod hardware;
pub mod layout;
pub mod time;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, Frame};
pub use config::Config;
pub use time::DateTime;
