//! Configuration loading and parsing
//!
//! Node settings come from the `node.toml` compiled into the firmware,
//! parsed by a custom no_std parser. The bus address is loaded from flash.

pub mod loader;
pub mod toml;

pub use loader::load_config;
pub use toml::parse_config;
