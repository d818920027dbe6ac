//! Decoding of raw AS5045 readings
//!
//! Nodes forward the three bytes clocked out of the sensor untouched; the
//! master unpacks them here. The 18 significant bits are MSB-aligned:
//!
//! ```text
//!  byte 0           byte 1           byte 2
//!  D11 ........ D4  D3 .. D0 OCF COF LIN INC DEC PAR x x x x x x
//! ```

use crate::messages::RawReading;

/// Angle counts per revolution (12-bit)
pub const COUNTS_PER_REV: u16 = 4096;

const ANGLE_BITS: u32 = 12;
const STATUS_BITS: u32 = 6;

/// Decoded sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderReading {
    /// Angle and status, right-aligned (18 bits)
    bits: u32,
}

/// The six status bits following the angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u8);

/// Magnetic field strength indication from MagINC/MagDEC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagnetField {
    /// No movement of the magnet along the axis
    InRange,
    /// Magnet moving toward the sensor
    Increasing,
    /// Magnet moving away from the sensor
    Decreasing,
    /// Field outside the usable range
    OutOfRange,
}

impl Status {
    /// Offset compensation finished
    pub fn ocf(self) -> bool {
        self.0 & 0x20 != 0
    }

    /// CORDIC overflow, angle invalid
    pub fn cof(self) -> bool {
        self.0 & 0x10 != 0
    }

    /// Linearity alarm
    pub fn lin(self) -> bool {
        self.0 & 0x08 != 0
    }

    /// Magnitude increasing
    pub fn mag_inc(self) -> bool {
        self.0 & 0x04 != 0
    }

    /// Magnitude decreasing
    pub fn mag_dec(self) -> bool {
        self.0 & 0x02 != 0
    }

    /// Even parity bit
    pub fn parity(self) -> bool {
        self.0 & 0x01 != 0
    }

    /// Raw status bits
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl EncoderReading {
    /// Unpack the raw bytes returned by a node
    pub fn from_raw(raw: RawReading) -> Self {
        let word = u32::from(raw[0]) << 16 | u32::from(raw[1]) << 8 | u32::from(raw[2]);
        Self {
            bits: word >> (24 - ANGLE_BITS - STATUS_BITS),
        }
    }

    /// 12-bit angle, 0..4095
    pub fn angle(&self) -> u16 {
        (self.bits >> STATUS_BITS) as u16
    }

    /// Status bits
    pub fn status(&self) -> Status {
        Status((self.bits & ((1 << STATUS_BITS) - 1)) as u8)
    }

    /// Even parity over all 18 bits holds
    pub fn parity_ok(&self) -> bool {
        self.bits.count_ones() % 2 == 0
    }

    /// Field strength indication
    pub fn magnet_field(&self) -> MagnetField {
        let status = self.status();
        match (status.mag_inc(), status.mag_dec()) {
            (false, false) => MagnetField::InRange,
            (true, false) => MagnetField::Increasing,
            (false, true) => MagnetField::Decreasing,
            (true, true) => MagnetField::OutOfRange,
        }
    }

    /// True if the angle can be trusted
    ///
    /// Offset compensation must be finished, no CORDIC overflow, no
    /// linearity alarm, and parity must hold. An all-zero reading (for
    /// example a stalled link) fails on OCF.
    pub fn is_valid(&self) -> bool {
        let status = self.status();
        status.ocf() && !status.cof() && !status.lin() && self.parity_ok()
    }

    /// Angle relative to `zero_offset` counts, in tenths of a degree
    pub fn degrees_x10(&self, zero_offset: u16) -> u16 {
        let zero = zero_offset % COUNTS_PER_REV;
        let counts = (self.angle() + COUNTS_PER_REV - zero) % COUNTS_PER_REV;
        (u32::from(counts) * 3600 / u32::from(COUNTS_PER_REV)) as u16
    }
}
