//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use anglebus_hal::LineFault;

/// At most one byte in flight between the line and the parser
const LINE_CHANNEL_SIZE: usize = 1;

/// What the bus receiver saw on the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEvent {
    /// One received byte, in line order
    Byte(u8),
    /// Receive error; the byte stream position is lost
    Fault(LineFault),
}

/// Received bytes and line faults, from the bus RX task to the node task
pub static LINE_CHANNEL: Channel<CriticalSectionRawMutex, LineEvent, LINE_CHANNEL_SIZE> =
    Channel::new();
