//! STM32F103 Blue Pill PCF8583 Clock with 20x4 Character LCD
//! =============================================================================================
//!
//! Same clock as `clock`, rendered on the coop controller's HD44780 20x4 LCD in 4-bit mode.
//! The RTC shares nothing with the display, so it sits alone on I2C1.
//!
//! Hardware Connections:
//!   LCD (HD44780) -> Blue Pill
//!      VSS  -> GND
//!      VDD  -> 5V
//!      RW   -> GND
//!      RS   -> PA8
//!      E    -> PA9
//!      D4   -> PB12
//!      D5   -> PB13
//!      D6   -> PB14
//!      D7   -> PB15
//!
//!   PCF8583 -> Blue Pill
//!      A0   -> GND (slave address 0xA0)
//!      SDA  -> PB7 (I2C1)
//!      SCL  -> PB6 (I2C1)

#![no_std]
#![no_main]

use core::ops::ControlFlow;

use coop_clock::{
    Clock, Config, Frame,
    hardware::{Hd44780, Pcf8583, StatusLed, traits::Led},
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    i2c::I2c,
    time::Hertz,
};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

/// Main application entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(Default::default());
    info!("PCF8583 clock (LCD) started");

    let rtc_i2c = I2c::new_blocking(
        p.I2C1,
        p.PB6,
        p.PB7,
        Hertz::khz(100),
        Default::default(),
    );

    let mut lcd = Hd44780::new(
        Output::new(p.PA8, Level::Low, Speed::Low),
        Output::new(p.PA9, Level::Low, Speed::Low),
        [
            Output::new(p.PB12, Level::Low, Speed::Low),
            Output::new(p.PB13, Level::Low, Speed::Low),
            Output::new(p.PB14, Level::Low, Speed::Low),
            Output::new(p.PB15, Level::Low, Speed::Low),
        ],
        Delay,
    );
    lcd.init().unwrap();

    let mut led = StatusLed::new(Output::new(p.PC13, Level::High, Speed::Low)).unwrap();

    let mut clock = Clock::new(Pcf8583::new(rtc_i2c), lcd, Config::default());

    if let Err(e) = clock.seed() {
        error!("seeding the RTC failed: {}", e);
    }

    let result = clock.run(&mut Delay, |frame| {
        match frame {
            Frame::Time(_) => led.toggle().unwrap(),
            Frame::Fault => led.on().unwrap(),
        }
        ControlFlow::Continue(())
    });

    if let Err(e) = result {
        defmt::panic!("LCD failed: {}", Debug2Format(&e));
    }
}
