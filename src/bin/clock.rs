//! STM32F103 Blue Pill PCF8583 Clock with OLED Display
//! =============================================================================================
//!
//! This firmware keeps wall-clock time in a PCF8583 RTC and renders it using:
//! - SSD1306 OLED display (128x64) via I2C1, driven as a 20x4 character grid
//! - PCF8583 real-time clock via I2C2
//!
//! Hardware Connections:
//!   OLED Display -> Blue Pill
//!      GND  -> GND
//!      VCC  -> 5V
//!      SDA  -> PB7 (I2C1)
//!      SCL  -> PB6 (I2C1)
//!
//!   PCF8583 -> Blue Pill
//!      VDD  -> 3.3V (battery backed)
//!      VSS  -> GND
//!      A0   -> GND (slave address 0xA0)
//!      SDA  -> PB11 (I2C2)
//!      SCL  -> PB10 (I2C2)
//!
//! Behaviour:
//! 1. Seeds the RTC once at power-up
//! 2. Reads and redraws date and time every cycle (about once per second)
//! 3. Onboard LED toggles on every good reading and stays lit while the RTC cannot be read

#![no_std]
#![no_main]

use core::ops::ControlFlow;

use coop_clock::{
    Clock, Config, Frame,
    hardware::{OledGrid, Pcf8583, StatusLed, traits::Led},
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    i2c::I2c,
    time::Hertz,
};
use embassy_time::Delay;
use ssd1306::{I2CDisplayInterface, Ssd1306, prelude::*};
use {defmt_rtt as _, panic_probe as _};

/// Main application entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // Initialize peripherals with default configuration
    let p = embassy_stm32::init(Default::default());
    info!("PCF8583 clock started");

    // OLED on I2C1 at 400kHz
    let display_i2c = I2c::new_blocking(
        p.I2C1,
        p.PB6,
        p.PB7,
        Hertz::khz(400),
        Default::default(),
    );

    // PCF8583 on I2C2, standard mode
    let rtc_i2c = I2c::new_blocking(
        p.I2C2,
        p.PB10,
        p.PB11,
        Hertz::khz(100),
        Default::default(),
    );

    // Initialize display interface and controller
    let interface = I2CDisplayInterface::new(display_i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display.init().unwrap();
    display.clear_buffer();

    // Onboard LED (PC13) as status indicator
    let mut led = StatusLed::new(Output::new(p.PC13, Level::High, Speed::Low)).unwrap();

    let config = Config::default();
    let mut clock = Clock::new(Pcf8583::new(rtc_i2c), OledGrid::new(display), config);

    if let Err(e) = clock.seed() {
        error!("seeding the RTC failed: {}", e);
    }

    // Poll loop - never breaks
    let result = clock.run(&mut Delay, |frame| {
        match frame {
            Frame::Time(_) => led.toggle().unwrap(),
            Frame::Fault => led.on().unwrap(),
        }
        ControlFlow::Continue(())
    });

    if let Err(e) = result {
        defmt::panic!("display failed: {}", Debug2Format(&e));
    }
}
