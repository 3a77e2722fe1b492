//! System-wide configuration
//!
//! Stored as TOML at `$LULL_CONFIG`, or `<config dir>/lull/config.toml`
//! when the variable is unset. A missing file means all defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use timing::RateLimiter;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "LULL_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub debounce: DebounceConfig,
    pub rate_limit: RateLimitConfig,
}

/// `[debounce]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet period in milliseconds (default: 300)
    pub delay_ms: i64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { delay_ms: 300 }
    }
}

/// `[rate_limit]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Tokens refilled per second, per key (default: 5)
    pub per_second: f64,
    /// Bucket capacity, per key (default: 10)
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: timing::ratelimit::DEFAULT_PER_SECOND,
            burst: timing::ratelimit::DEFAULT_BURST,
        }
    }
}

impl SystemConfig {
    /// Check every value against its valid range
    pub fn validate(&self) -> Result<()> {
        let delay_ms = self.debounce.delay_ms;
        if !(0..=60_000).contains(&delay_ms) {
            anyhow::bail!("debounce.delay_ms must be between 0 and 60000 (got {})", delay_ms);
        }

        let per_second = self.rate_limit.per_second;
        if !per_second.is_finite() || per_second <= 0.0 || per_second > 10_000.0 {
            anyhow::bail!(
                "rate_limit.per_second must be in (0, 10000] (got {})",
                per_second
            );
        }

        let burst = self.rate_limit.burst;
        if !(1..=100_000).contains(&burst) {
            anyhow::bail!("rate_limit.burst must be between 1 and 100000 (got {})", burst);
        }

        Ok(())
    }

    /// Debounce delay as a duration
    pub fn delay(&self) -> Result<Duration> {
        timing::delay_from_millis(self.debounce.delay_ms).context("Invalid debounce delay")
    }

    /// Build a rate limiter from the `[rate_limit]` section
    pub fn limiter<K>(&self) -> Result<RateLimiter<K>>
    where
        K: Eq + std::hash::Hash + Clone,
    {
        RateLimiter::new(self.rate_limit.per_second, self.rate_limit.burst)
            .context("Invalid rate limit settings")
    }
}

/// Default location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("lull").join("config.toml"))
}

/// Resolve an explicit `--config` path or fall back to the default location
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path().context("Could not determine config file path"),
    }
}

/// Load configuration, returning defaults if the file does not exist
pub fn load_from(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(SystemConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

/// Write configuration, creating parent directories as needed
pub fn save_to(path: &Path, config: &SystemConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let serialized = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, serialized)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Create the config file with defaults if it does not exist
///
/// Returns true if a file was created.
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_to(path, &SystemConfig::default())?;
    Ok(true)
}

/// Documented example configuration
pub fn example_config() -> String {
    let defaults = SystemConfig::default();
    format!(
        r#"# Lull configuration

[debounce]
# Quiet period before a debounced action runs (0-60000 ms)
delay_ms = {}

[rate_limit]
# Tokens refilled per second for each key
per_second = {:.1}
# Maximum requests allowed in a burst for each key (1-100000)
burst = {}
"#,
        defaults.debounce.delay_ms, defaults.rate_limit.per_second, defaults.rate_limit.burst
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = SystemConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delay().unwrap(), Duration::from_millis(300));
        assert_eq!(config.rate_limit.burst, 10);
    }

    #[test]
    fn test_negative_delay_rejected() {
        let mut config = SystemConfig::default();
        config.debounce.delay_ms = -1;
        assert!(config.validate().is_err());
        assert!(config.delay().is_err());
    }

    #[test]
    fn test_zero_burst_rejected() {
        let mut config = SystemConfig::default();
        config.rate_limit.burst = 0;
        assert!(config.validate().is_err());
        assert!(config.limiter::<String>().is_err());
    }

    #[test]
    fn test_non_finite_rate_rejected() {
        let mut config = SystemConfig::default();
        config.rate_limit.per_second = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, SystemConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/config.toml");

        let mut config = SystemConfig::default();
        config.debounce.delay_ms = 75;
        config.rate_limit.per_second = 2.5;
        config.rate_limit.burst = 4;
        save_to(&path, &config).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[rate_limit]\nburst = 3\n").unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.rate_limit.burst, 3);
        assert_eq!(config.rate_limit.per_second, 5.0);
        assert_eq!(config.debounce.delay_ms, 300);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[debounce]\ndelay_ms = -20\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("delay_ms"));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_example_config_parses() {
        let config: SystemConfig = toml::from_str(&example_config()).unwrap();
        assert_eq!(config, SystemConfig::default());
    }

    #[test]
    fn test_init_if_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        assert!(init_if_missing(&path).unwrap());
        assert!(!init_if_missing(&path).unwrap());
        assert_eq!(load_from(&path).unwrap(), SystemConfig::default());
    }
}
