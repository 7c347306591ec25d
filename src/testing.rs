//! Host-side stand-ins for the bus, the display, the delay and GPIO pins.

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation};

use crate::hardware::pcf8583::{ADDRESS, registers};
use crate::hardware::traits::CharDisplay;

/// Register-level model of a PCF8583 with fault injection.
pub struct FakePcf8583 {
    address: u8,
    ram: [u8; 256],
    pointer: u8,
    writes: Vec<(u8, u8)>,
    transactions: usize,
    ok_before_fail: usize,
    failures: usize,
    /// (transactions completed, register, value) applied by the chip itself
    scheduled: Vec<(usize, u8, u8)>,
}

impl FakePcf8583 {
    /// Chip at the default address, counting, set to 00:00:00 on the 1st of January.
    pub fn new() -> Self {
        let mut ram = [0u8; 256];
        ram[usize::from(registers::YEAR_DATE)] = 0x01;
        ram[usize::from(registers::WEEKDAY_MONTH)] = 0x01;
        Self {
            address: ADDRESS,
            ram,
            pointer: 0,
            writes: Vec::new(),
            transactions: 0,
            ok_before_fail: 0,
            failures: 0,
            scheduled: Vec::new(),
        }
    }

    pub fn set_register(&mut self, register: u8, value: u8) {
        self.ram[usize::from(register)] = value;
    }

    pub fn register(&self, register: u8) -> u8 {
        self.ram[usize::from(register)]
    }

    /// Change a register once `transactions` transactions have completed, like the chip
    /// counting on its own between two accesses.
    pub fn set_after(&mut self, transactions: usize, register: u8, value: u8) {
        self.scheduled.push((transactions, register, value));
    }

    /// Data bytes written by the host, as (register, value).
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Transactions attempted, failed ones included.
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// NACK the next `count` transactions.
    pub fn fail_next(&mut self, count: usize) {
        self.fail_after(0, count);
    }

    /// Let `ok` transactions through, then NACK the following `count`.
    pub fn fail_after(&mut self, ok: usize, count: usize) {
        self.ok_before_fail = ok;
        self.failures = count;
    }
}

impl i2c::ErrorType for FakePcf8583 {
    type Error = ErrorKind;
}

impl I2c for FakePcf8583 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let done = self.transactions;
        let ram = &mut self.ram;
        self.scheduled.retain(|&(after, register, value)| {
            if after <= done {
                ram[usize::from(register)] = value;
            }
            after > done
        });
        self.transactions += 1;

        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        if self.failures > 0 {
            if self.ok_before_fail > 0 {
                self.ok_before_fail -= 1;
            } else {
                self.failures -= 1;
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
            }
        }

        let mut addressed = false;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        if !addressed {
                            self.pointer = byte;
                            addressed = true;
                        } else {
                            self.ram[usize::from(self.pointer)] = byte;
                            self.writes.push((self.pointer, byte));
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.ram[usize::from(self.pointer)];
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOp {
    Cursor(u8),
    Char(u8),
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFault;

/// Character display that records every call and keeps a DDRAM image.
pub struct FakeDisplay {
    pub ddram: [u8; 128],
    cursor: u8,
    pub ops: Vec<DisplayOp>,
    pub fail: bool,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self {
            ddram: [b' '; 128],
            cursor: 0,
            ops: Vec::new(),
            fail: false,
        }
    }

    /// `len` characters starting at `address`.
    pub fn text(&self, address: u8, len: usize) -> String {
        let start = usize::from(address);
        self.ddram[start..start + len]
            .iter()
            .map(|&c| char::from(c))
            .collect()
    }
}

impl CharDisplay for FakeDisplay {
    type Error = DisplayFault;

    fn set_cursor(&mut self, address: u8) -> Result<(), Self::Error> {
        if self.fail {
            return Err(DisplayFault);
        }
        self.cursor = address & 0x7F;
        self.ops.push(DisplayOp::Cursor(address));
        Ok(())
    }

    fn write_char(&mut self, code: u8) -> Result<(), Self::Error> {
        if self.fail {
            return Err(DisplayFault);
        }
        self.ddram[usize::from(self.cursor)] = code;
        self.cursor = (self.cursor + 1) & 0x7F;
        self.ops.push(DisplayOp::Char(code));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.ops.push(DisplayOp::Flush);
        Ok(())
    }
}

/// Delay that only keeps count.
#[derive(Default)]
pub struct FakeDelay {
    pub total_ns: u64,
    pub ms_calls: Vec<u32>,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms_calls.push(ms);
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}

struct PinState {
    levels: [bool; 8],
    /// Pin whose falling edge latches (RS, D4-D7)
    strobe: Option<usize>,
    latched: Vec<(bool, u8)>,
}

/// Shared levels of a set of fake GPIO pins.
#[derive(Clone)]
pub struct PinBus(Rc<RefCell<PinState>>);

impl PinBus {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(PinState {
            levels: [false; 8],
            strobe: None,
            latched: Vec::new(),
        })))
    }

    /// Bus wired like an HD44780 in 4-bit mode: pin 0 RS, pin 1 E, pins 2-5 D4-D7.
    ///
    /// Every falling edge on E records (RS, nibble).
    pub fn hd44780() -> Self {
        let bus = Self::new();
        bus.0.borrow_mut().strobe = Some(1);
        bus
    }

    pub fn level(&self, pin: usize) -> bool {
        self.0.borrow().levels[pin]
    }

    pub fn latched(&self) -> Vec<(bool, u8)> {
        self.0.borrow().latched.clone()
    }

    /// Latched nibbles after the first `skip`, paired back into (RS, byte), high nibble first.
    pub fn bytes(&self, skip: usize) -> Vec<(bool, u8)> {
        self.latched()[skip..]
            .chunks(2)
            .map(|pair| (pair[0].0, pair[0].1 << 4 | pair.get(1).map_or(0, |p| p.1)))
            .collect()
    }

    fn set(&self, pin: usize, high: bool) {
        let mut state = self.0.borrow_mut();
        let was_high = state.levels[pin];
        state.levels[pin] = high;

        if state.strobe == Some(pin) && was_high && !high {
            let nibble = (2..6)
                .enumerate()
                .fold(0u8, |acc, (bit, p)| acc | (u8::from(state.levels[p]) << bit));
            let rs = state.levels[0];
            state.latched.push((rs, nibble));
        }
    }
}

pub struct FakePin {
    bus: PinBus,
    id: usize,
}

impl FakePin {
    pub fn new(bus: &PinBus, id: usize) -> Self {
        Self {
            bus: bus.clone(),
            id,
        }
    }
}

impl digital::ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bus.set(self.id, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bus.set(self.id, true);
        Ok(())
    }
}
