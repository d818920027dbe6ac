//! RP2040-specific HAL for the encoder node firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `anglebus-hal` traits:
//!
//! - Flash storage driver (implements `anglebus_hal::FlashStorage`)
//! - Push-pull outputs for chip select and RS-485 driver enable
//! - SPI0 byte exchange with completion polling for the angle sensor
//! - Blocking UART transmit and receive error mapping

#![no_std]

pub mod flash;
pub mod gpio;
pub mod spi;
pub mod uart;

// Re-export shared traits from anglebus-hal for convenience
pub use anglebus_hal::{FlashStorage as FlashStorageTrait, StorageKey};
