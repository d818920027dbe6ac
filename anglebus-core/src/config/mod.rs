//! Configuration types
//!
//! Node configuration is compiled in; only the bus address is persisted.

pub mod address;
pub mod types;

pub use address::{
    load_address, read_address, resolve_address, store_address, UNCONFIGURED_ADDRESS,
};
pub use types::*;
