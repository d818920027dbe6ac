//! Hardware driver implementations
//!
//! Concrete implementations on top of the `anglebus-hal` traits:
//!
//! - AS5045 magnetic angle sensor ([`sensor::as5045`])
//! - RS-485 half-duplex reply transmitter ([`bus::rs485`])

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod sensor;
