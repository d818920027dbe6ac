//! Angle sensors

pub mod as5045;

pub use as5045::{As5045, As5045Config};
