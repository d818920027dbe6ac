//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::address::UNCONFIGURED_ADDRESS;

/// Address used when none has been persisted
pub const DEFAULT_FALLBACK_ADDRESS: u8 = 0xA0;

/// Default bus baud rate
pub const DEFAULT_BAUDRATE: u32 = 57_600;

/// Default delay between the end of a request and driving the line
pub const DEFAULT_TURNAROUND_US: u32 = 500;

/// Default completion polls per sensor byte before giving up
pub const DEFAULT_MAX_POLLS: u32 = 10_000;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Fallback address is the "not configured" sentinel
    ReservedAddress,
    /// Baud rate of zero
    InvalidBaudrate,
    /// Transducer poll budget of zero
    InvalidPollBudget,
}

/// Bus line settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// Baud rate (8N1)
    pub baudrate: u32,
    /// Settle time before a reply is driven onto the line, in microseconds
    pub turnaround_us: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            turnaround_us: DEFAULT_TURNAROUND_US,
        }
    }
}

/// Angle sensor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransducerConfig {
    /// Transfer-complete polls per byte before the read times out
    pub max_polls: u32,
}

impl Default for TransducerConfig {
    fn default() -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// Complete node configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// Address used while storage holds none
    pub fallback_address: u8,
    /// Bus line settings
    pub bus: BusConfig,
    /// Angle sensor settings
    pub transducer: TransducerConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            fallback_address: DEFAULT_FALLBACK_ADDRESS,
            bus: BusConfig::default(),
            transducer: TransducerConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Check the configuration for values the node cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback_address == UNCONFIGURED_ADDRESS {
            return Err(ConfigError::ReservedAddress);
        }
        if self.bus.baudrate == 0 {
            return Err(ConfigError::InvalidBaudrate);
        }
        if self.transducer.max_polls == 0 {
            return Err(ConfigError::InvalidPollBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = NodeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.bus.baudrate, 57_600);
    }

    #[test]
    fn test_validate_rejects_sentinel_fallback() {
        let config = NodeConfig {
            fallback_address: UNCONFIGURED_ADDRESS,
            ..NodeConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ReservedAddress));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = NodeConfig::default();
        config.bus.baudrate = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidBaudrate));

        let mut config = NodeConfig::default();
        config.transducer.max_polls = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPollBudget));
    }
}
