//! Events that trigger state transitions

/// Events that can trigger node state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeEvent {
    /// An address assignment addressed to this node was accepted
    AssignReceived(u8),
    /// The new address reached persistent storage
    Persisted,
    /// Writing the new address failed
    PersistFailed,
}
