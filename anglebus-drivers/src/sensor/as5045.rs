//! AS5045 12-bit magnetic rotary encoder (SSI read over SPI)
//!
//! The sensor shifts out 18 bits per read while chip select is held low:
//!
//! ```text
//! | angle (12) | OCF | COF | LIN | MagINC | MagDEC | parity |
//! ```
//!
//! Three byte exchanges clock out 24 bits; the trailing 6 are don't-care.
//! The bytes are returned unmodified, decoding happens on the master side
//! (see [`anglebus_protocol::EncoderReading`]).
//!
//! # Bus settings
//!
//! SPI mode 2 (clock idles high, data captured on the first edge), at most
//! 1 MHz. Chip select is active low.

use anglebus_core::config::{TransducerConfig, DEFAULT_MAX_POLLS};
use anglebus_core::traits::{Transducer, TransducerError};
use anglebus_hal::{OutputPin, SpiExchange};
use anglebus_protocol::{EncoderReading, RawReading};

/// Byte shifted out while clocking the sensor
const DUMMY_BYTE: u8 = 0x00;

/// AS5045 driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct As5045Config {
    /// Transfer-complete polls per byte before the read times out
    pub max_polls: u32,
}

impl Default for As5045Config {
    fn default() -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

impl From<&TransducerConfig> for As5045Config {
    fn from(config: &TransducerConfig) -> Self {
        Self {
            max_polls: config.max_polls,
        }
    }
}

/// AS5045 driver
pub struct As5045<S, P> {
    spi: S,
    cs: P,
    config: As5045Config,
}

impl<S: SpiExchange, P: OutputPin> As5045<S, P> {
    /// Create a new driver; chip select is released immediately
    pub fn new(spi: S, mut cs: P, config: As5045Config) -> Self {
        cs.set_high();
        Self { spi, cs, config }
    }

    /// Get configuration
    pub fn config(&self) -> &As5045Config {
        &self.config
    }

    /// Read and decode one sample
    pub fn read(&mut self) -> Result<EncoderReading, TransducerError> {
        self.read_raw().map(EncoderReading::from_raw)
    }

    /// Release the SPI bus and chip select pin
    pub fn release(self) -> (S, P) {
        (self.spi, self.cs)
    }

    fn exchange(&mut self) -> Result<u8, TransducerError> {
        self.spi
            .start(DUMMY_BYTE)
            .map_err(|_| TransducerError::Bus)?;

        for _ in 0..self.config.max_polls {
            if self.spi.transfer_complete() {
                return Ok(self.spi.take());
            }
        }
        Err(TransducerError::Timeout)
    }

    fn clock_out(&mut self) -> Result<RawReading, TransducerError> {
        let mut raw = [0u8; 3];
        for byte in raw.iter_mut() {
            *byte = self.exchange()?;
        }
        Ok(raw)
    }
}

impl<S: SpiExchange, P: OutputPin> Transducer for As5045<S, P> {
    fn read_raw(&mut self) -> Result<RawReading, TransducerError> {
        self.cs.set_low();
        let result = self.clock_out();
        // Released on every path, the sensor restarts its output on the next select
        self.cs.set_high();
        result
    }
}
