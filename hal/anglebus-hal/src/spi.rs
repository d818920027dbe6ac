//! SPI byte exchange abstractions
//!
//! The angle sensor is read one byte at a time: the master starts an
//! exchange by shifting out a dummy byte, then waits for the peripheral to
//! report transfer completion before collecting the byte clocked in.
//! Splitting start and completion lets drivers put a bound on the wait.

/// Byte-wise SPI master link
pub trait SpiExchange {
    /// Error type for SPI operations
    type Error;

    /// Start shifting `byte` out; the received byte becomes available once
    /// [`transfer_complete`](Self::transfer_complete) reports `true`
    fn start(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Poll the transfer-complete flag
    fn transfer_complete(&mut self) -> bool;

    /// Take the byte received by the last completed exchange
    fn take(&mut self) -> u8;
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock mode
    pub mode: Mode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz, AS5045 allows up to 1 MHz
            mode: Mode::Mode2,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
