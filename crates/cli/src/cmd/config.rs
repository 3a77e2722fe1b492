//! Configuration management command
//!
//! Provides CLI interface to view and edit the configuration file.

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

/// Every settable key, in display order
pub const KEYS: &[&str] = &[
    "debounce.delay_ms",
    "rate_limit.per_second",
    "rate_limit.burst",
];

/// List all configuration values
pub async fn run_list(config_path: &Path) -> Result<()> {
    let config = system_config::load_from(config_path)?;

    println!("{}", "Lull Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[debounce]".yellow());
    println!(
        "  {} = {} {}",
        "delay_ms".cyan(),
        config.debounce.delay_ms,
        if config.debounce.delay_ms == 0 {
            "(next tick)".dimmed().to_string()
        } else {
            format!("({}ms quiet period)", config.debounce.delay_ms).dimmed().to_string()
        }
    );

    println!("\n{}", "[rate_limit]".yellow());
    println!(
        "  {} = {} {}",
        "per_second".cyan(),
        config.rate_limit.per_second,
        "(tokens/s per key)".dimmed()
    );
    println!("  {} = {}", "burst".cyan(), config.rate_limit.burst);

    println!("\n{}", "Valid Ranges:".bold());
    println!("  delay_ms: 0-60,000");
    println!("  per_second: >0 to 10,000");
    println!("  burst: 1-100,000");

    Ok(())
}

/// Look up a single value by dotted key
pub fn get_value(config: &SystemConfig, key: &str) -> Result<String> {
    let value = match key {
        "debounce.delay_ms" => config.debounce.delay_ms.to_string(),
        "rate_limit.per_second" => config.rate_limit.per_second.to_string(),
        "rate_limit.burst" => config.rate_limit.burst.to_string(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'lull config list' to see available keys.",
            key
        ),
    };
    Ok(value)
}

/// Parse and assign a single value, then validate the whole config
pub fn set_value(config: &mut SystemConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "debounce.delay_ms" => {
            config.debounce.delay_ms = value
                .parse()
                .context("Invalid value: must be an integer number of milliseconds")?;
        }
        "rate_limit.per_second" => {
            config.rate_limit.per_second = value
                .parse()
                .context("Invalid value: must be a positive number")?;
        }
        "rate_limit.burst" => {
            config.rate_limit.burst = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'lull config list' to see available keys.",
            key
        ),
    }

    config.validate().context("Invalid configuration value")
}

/// Get a single configuration value
pub async fn run_get(config_path: &Path, key: &str) -> Result<()> {
    let config = system_config::load_from(config_path)?;
    println!("{}", get_value(&config, key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(config_path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load_from(config_path)?;
    set_value(&mut config, key, value)?;
    system_config::save_to(config_path, &config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(config_path: &Path, create: bool) -> Result<()> {
    if create && system_config::init_if_missing(config_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else {
        println!("{}", config_path.display());
        if !config_path.exists() {
            println!("{}", "File does not exist. Use --create to create it.".yellow());
        }
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", system_config::example_config());
    Ok(())
}
