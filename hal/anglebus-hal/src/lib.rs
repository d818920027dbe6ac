//! anglebus Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The node logic, the sensor driver and the
//! address persistence are written against these traits only.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  anglebus-core / anglebus-drivers        │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  anglebus-hal (this crate - traits)      │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ anglebus-hal-   │
//!            │     rp2040      │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - chip select and RS-485 driver enable
//! - [`uart::UartTx`], [`uart::LineFault`] - half-duplex bus line
//! - [`spi::SpiExchange`] - byte-wise sensor link with completion polling
//! - [`flash::FlashStorage`] - persistent node address

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod spi;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::OutputPin;
pub use spi::SpiExchange;
pub use uart::{LineFault, UartConfig, UartTx};
