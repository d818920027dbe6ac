//! Hardware abstraction traits
//!
//! These traits define the interface between the node logic and
//! hardware-specific implementations.

pub mod transducer;

pub use transducer::{Transducer, TransducerError};
