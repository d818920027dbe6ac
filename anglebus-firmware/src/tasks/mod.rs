//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod bus_rx;
pub mod node;
pub mod tick;

pub use bus_rx::bus_rx_task;
pub use node::node_task;
pub use tick::tick_task;
