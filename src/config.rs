//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! tide-windows.toml file. It provides a centralized way to configure the
//! target coordinate, query ranges, and feed settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration loaded from tide-windows.toml
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Target coordinate
    pub location: LocationConfig,
    /// Query ranges
    pub query: QueryConfig,
    /// Upstream feed settings
    pub feeds: FeedsConfig,
}

/// Coordinate the feeds are queried for
#[derive(Debug, Deserialize, Serialize)]
pub struct LocationConfig {
    /// Human-readable place name for the report header
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// How far ahead and back the feeds are queried
#[derive(Debug, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Days of tide and weather forecast to consider
    pub days_ahead: u32,
    /// Days of rainfall history behind the ground-saturation assessment
    pub rainfall_days_back: u32,
}

/// Upstream feed settings
#[derive(Debug, Deserialize, Serialize)]
pub struct FeedsConfig {
    /// Per-request timeout in seconds; a feed that blocks longer fails
    /// rather than hangs
    pub timeout_secs: u64,
    /// WorldTides API key. The WORLDTIDES_API_KEY environment variable
    /// takes precedence when set.
    pub worldtides_api_key: String,
}

impl FeedsConfig {
    /// Resolve the tide feed credential, preferring the environment.
    pub fn tide_api_key(&self) -> String {
        std::env::var("WORLDTIDES_API_KEY").unwrap_or_else(|_| self.worldtides_api_key.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                name: "Dublin (North Wall)".to_string(),
                latitude: 53.3498,
                longitude: -6.2603,
            },
            query: QueryConfig {
                days_ahead: 7,
                rainfall_days_back: 7,
            },
            feeds: FeedsConfig {
                timeout_secs: 10,
                worldtides_api_key: String::new(),
            },
        }
    }
}

impl Config {
    /// Load configuration from tide-windows.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path("tide-windows.toml")
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!("loaded configuration for {}", config.location.name);
                    config
                }
                Err(e) => {
                    log::warn!("invalid config file format: {}", e);
                    log::warn!("using default configuration (Dublin, North Wall)");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("no config file found, using default configuration (Dublin, North Wall)");
                Self::default()
            }
        }
    }

    /// Save current configuration to tide-windows.toml
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write("tide-windows.toml", contents)?;
        log::info!("configuration saved to tide-windows.toml");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.location.name, "Dublin (North Wall)");
        assert!((config.location.latitude - 53.3498).abs() < 1e-9);
        assert!((config.location.longitude + 6.2603).abs() < 1e-9);
        assert_eq!(config.query.days_ahead, 7);
        assert_eq!(config.query.rainfall_days_back, 7);
        assert_eq!(config.feeds.timeout_secs, 10);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.location.name, parsed.location.name);
        assert_eq!(config.query.days_ahead, parsed.query.days_ahead);
        assert_eq!(config.feeds.timeout_secs, parsed.feeds.timeout_secs);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.location.name, "Dublin (North Wall)");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[location]
name = "Wicklow"
latitude = 52.9808
longitude = -6.0433

[query]
days_ahead = 3
rainfall_days_back = 5

[feeds]
timeout_secs = 20
worldtides_api_key = "test-key"
"#
        )
        .unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.location.name, "Wicklow");
        assert_eq!(config.query.days_ahead, 3);
        assert_eq!(config.query.rainfall_days_back, 5);
        assert_eq!(config.feeds.timeout_secs, 20);
        assert_eq!(config.feeds.worldtides_api_key, "test-key");
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not valid toml [[[").unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.location.name, "Dublin (North Wall)");
    }
}
