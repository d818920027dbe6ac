//! Simple TOML parser for node configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `node.toml`. It does NOT support the full TOML spec; `build.rs` checks
//! the file with a real TOML parser before it is compiled in.
//!
//! Supported features:
//! - Key = value pairs (integers, `_` digit separators allowed)
//! - [section] headers
//! - Comments (# ...)

use anglebus_core::config::{ConfigError, NodeConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value is not an integer in range
    InvalidValue,
    /// Line is neither a header nor a key/value pair
    Syntax,
    /// Values parsed but the configuration cannot be used
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Node,
    Bus,
    Transducer,
}

/// Parse TOML configuration into a validated NodeConfig
///
/// Keys that are not present keep their defaults.
pub fn parse_config(input: &str) -> Result<NodeConfig, ParseError> {
    let mut config = NodeConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line)
                .strip_prefix('[')
                .and_then(|h| h.strip_suffix(']'))
                .ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::Syntax)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

/// Parse section header like "bus"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "node" => Ok(Section::Node),
        "bus" => Ok(Section::Bus),
        "transducer" => Ok(Section::Transducer),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing comment
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => line[..pos].trim(),
        None => line,
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer value, allowing `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: heapless::String<16> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Apply a key/value pair to the configuration
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut NodeConfig,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Node, "fallback_address") => config.fallback_address = parse_int(value)?,
        (Section::Bus, "baudrate") => config.bus.baudrate = parse_int(value)?,
        (Section::Bus, "turnaround_us") => config.bus.turnaround_us = parse_int(value)?,
        (Section::Transducer, "max_polls") => config.transducer.max_polls = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
