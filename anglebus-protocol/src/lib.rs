//! anglebus field bus protocol
//!
//! This crate defines the frame format spoken between the bus master and
//! the AS5045 encoder nodes sharing one half-duplex RS-485 line. Any node
//! may see any byte on the wire, so every frame must be delimited
//! unambiguously even when its payload contains delimiter values.
//!
//! # Frame Overview
//!
//! ```text
//! ┌───────┬─────────┬─────────┬──────────┬──────────┬──────┐
//! │ START │ ADDRESS │ CONTROL │ DATA     │ CHECKSUM │ STOP │
//! │ 0x96  │ 1B      │ 1B      │ 0–3B     │ 1B       │ 0xA9 │
//! └───────┴─────────┴─────────┴──────────┴──────────┴──────┘
//! ```
//!
//! Address and data bytes equal to START or STOP travel XOR 1 with a flag
//! set in the control byte. The checksum is nudged off the delimiter values,
//! and the control byte cannot take them by construction, so START and STOP
//! only ever appear as delimiters.
//!
//! - [`frame`] - pure encode/decode, escaping and checksum
//! - [`parser`] - byte-at-a-time receive state machine
//! - [`messages`] - request commands and node replies
//! - [`reading`] - decoding of the raw AS5045 reading on the master side

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod parser;
pub mod reading;

pub use frame::{
    checksum, escape, ControlByte, Direction, Frame, FrameError, FRAME_START, FRAME_STOP,
    MAX_DATA_LEN, MAX_FRAME_SIZE,
};
pub use messages::{Command, RawReading, Reply};
pub use parser::FrameParser;
pub use reading::{EncoderReading, MagnetField, Status};
