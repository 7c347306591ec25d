use super::traits::Led;
use embedded_hal::digital::OutputPin;

/// Board LED wired between the supply and the pin, lit when driven low.
pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take the pin and switch the LED off.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_high()?;
        Ok(Self { pin, lit: false })
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl<P: OutputPin> Led for StatusLed<P> {
    type Error = P::Error;

    fn on(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()?;
        self.lit = true;
        Ok(())
    }

    fn off(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()?;
        self.lit = false;
        Ok(())
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        if self.lit { self.off() } else { self.on() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePin, PinBus};

    #[test]
    fn active_low() {
        let bus = PinBus::new();
        let mut led = StatusLed::new(FakePin::new(&bus, 0)).unwrap();
        assert!(bus.level(0));
        assert!(!led.is_lit());

        led.on().unwrap();
        assert!(!bus.level(0));
        assert!(led.is_lit());

        led.toggle().unwrap();
        assert!(bus.level(0));
        led.toggle().unwrap();
        assert!(!bus.level(0));
    }
}
