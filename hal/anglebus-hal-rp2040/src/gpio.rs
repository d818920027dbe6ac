//! GPIO outputs
//!
//! Wraps an embassy `Output` so drivers can take it as an
//! [`anglebus_hal::OutputPin`].

use embassy_rp::gpio::Output;

/// Push-pull output pin
pub struct Rp2040Output<'d> {
    pin: Output<'d>,
}

impl<'d> Rp2040Output<'d> {
    /// Wrap an already configured output
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl anglebus_hal::OutputPin for Rp2040Output<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
