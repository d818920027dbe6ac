//! Angle sensor trait

use anglebus_protocol::RawReading;

/// Errors from a transducer read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransducerError {
    /// The peripheral never signalled transfer completion
    Timeout,
    /// The link reported an error starting an exchange
    Bus,
}

/// Trait for the angle sensor behind a node
///
/// A read is a fixed three-byte exchange; the bytes are returned exactly as
/// clocked in, without interpretation.
pub trait Transducer {
    /// Read the three raw bytes
    fn read_raw(&mut self) -> Result<RawReading, TransducerError>;
}
