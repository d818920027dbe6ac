//! Configuration loading
//!
//! Falls back to built-in defaults if the embedded config cannot be used.

use defmt::*;

use anglebus_core::config::NodeConfig;

use super::toml::parse_config;

/// Embedded configuration (compiled into firmware)
/// Edit node.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../node.toml");

/// Parse the embedded configuration
pub fn load_config() -> NodeConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            // build.rs validates node.toml, so this means the two parsers disagree
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            NodeConfig::default()
        }
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &NodeConfig) {
    debug!("  fallback address {}", config.fallback_address);
    debug!(
        "  bus {} baud, turnaround {} us",
        config.bus.baudrate, config.bus.turnaround_us
    );
    debug!("  transducer max polls {}", config.transducer.max_polls);
}
