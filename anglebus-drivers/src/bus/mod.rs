//! Bus transceivers

pub mod rs485;

pub use rs485::{Rs485Error, Rs485Transmitter};
