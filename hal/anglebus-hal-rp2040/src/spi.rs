//! SPI byte exchange on SPI0
//!
//! The embassy blocking driver owns the pins and sets up clock and
//! format; single exchanges are then driven through the SSP registers so
//! the caller can bound the wait for completion.

use anglebus_hal::spi::{Mode, Phase, Polarity, SpiConfig};
use anglebus_hal::SpiExchange;
use embassy_rp::pac;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Blocking, Spi};

/// SPI exchange errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiError {
    /// Transmit FIFO full, a previous exchange never drained
    Busy,
}

/// Build the embassy SPI configuration
pub fn spi_config(config: &SpiConfig) -> spi::Config {
    let (polarity, phase): (Polarity, Phase) = config.mode.into();

    let mut cfg = spi::Config::default();
    cfg.frequency = config.frequency;
    cfg.polarity = match polarity {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    cfg.phase = match phase {
        Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };
    cfg
}

/// Byte-wise exchange over SPI0
pub struct Rp2040SpiExchange<'d> {
    _spi: Spi<'d, SPI0, Blocking>,
    mode: Mode,
}

impl<'d> Rp2040SpiExchange<'d> {
    /// Take over a configured SPI0 driver
    pub fn new(spi: Spi<'d, SPI0, Blocking>, config: &SpiConfig) -> Self {
        Self {
            _spi: spi,
            mode: config.mode,
        }
    }

    /// Clock mode the link was set up with
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl SpiExchange for Rp2040SpiExchange<'_> {
    type Error = SpiError;

    fn start(&mut self, byte: u8) -> Result<(), SpiError> {
        let regs = pac::SPI0;

        // Drop anything left over from an abandoned exchange
        while regs.sr().read().rne() {
            let _ = regs.dr().read();
        }
        if !regs.sr().read().tnf() {
            return Err(SpiError::Busy);
        }

        regs.dr().write(|w| w.set_data(byte as u16));
        Ok(())
    }

    fn transfer_complete(&mut self) -> bool {
        pac::SPI0.sr().read().rne()
    }

    fn take(&mut self) -> u8 {
        pac::SPI0.dr().read().data() as u8
    }
}
