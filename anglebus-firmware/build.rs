//! Build script for anglebus-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates node.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate node.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=node.toml");

    let config_path = Path::new("node.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: node.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a node.toml configuration file.           ║\n\
            ║  Please create one in the anglebus-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read node.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in node.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_node(&config, &mut errors);
    validate_bus(&config, &mut errors);
    validate_transducer(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid node configuration                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=node.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Get `[section]` as a table, recording an error if it is not one
fn section<'a>(
    config: &'a toml::Value,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::map::Map<String, toml::Value>> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        // Missing sections fall back to the firmware defaults
        None => None,
    }
}

/// Check an optional integer key against an inclusive range
fn check_range(
    table: &toml::map::Map<String, toml::Value>,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
        }
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
        None => {}
    }
}

/// Reject keys the firmware parser would refuse
fn check_keys(
    table: &toml::map::Map<String, toml::Value>,
    section: &str,
    known: &[&str],
    errors: &mut Vec<String>,
) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", section, key));
        }
    }
}

/// Validate the [node] section
fn validate_node(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(node) = section(config, "node", errors) else {
        return;
    };
    check_keys(node, "node", &["fallback_address"], errors);
    // 255 marks an unassigned address in flash
    check_range(node, "node", "fallback_address", 0, 254, errors);
}

/// Validate the [bus] section
fn validate_bus(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(bus) = section(config, "bus", errors) else {
        return;
    };
    check_keys(bus, "bus", &["baudrate", "turnaround_us"], errors);
    check_range(bus, "bus", "baudrate", 1200, 1_000_000, errors);
    check_range(bus, "bus", "turnaround_us", 0, 100_000, errors);
}

/// Validate the [transducer] section
fn validate_transducer(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(transducer) = section(config, "transducer", errors) else {
        return;
    };
    check_keys(transducer, "transducer", &["max_polls"], errors);
    check_range(
        transducer,
        "transducer",
        "max_polls",
        1,
        u32::MAX as i64,
        errors,
    );
}
