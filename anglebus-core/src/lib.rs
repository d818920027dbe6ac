//! Board-agnostic node logic for anglebus encoder nodes
//!
//! This crate contains all node behavior that does not depend on specific
//! hardware:
//!
//! - Node configuration and persisted address handling
//! - Address filter and command dispatcher
//! - Node lifecycle state machine (listening, reconfiguring, restart)
//! - The transducer trait the angle sensor driver implements

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod node;
pub mod state;
pub mod traits;

pub use node::{IgnoreReason, Node, Outcome};
pub use state::{NodeEvent, NodeState};
