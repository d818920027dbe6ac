//! Node lifecycle state machine
//!
//! A node listens until it is told to take a new address. It then waits
//! for the address to be persisted and ends in `Restart`; the new address
//! only takes effect after the restart.

pub mod events;
pub mod machine;

pub use events::NodeEvent;
pub use machine::NodeState;
