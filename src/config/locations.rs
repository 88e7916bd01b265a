//! Location seed configuration loading from locations.toml
//!
//! Storage locations and their capacity thresholds can be described in a TOML file.
//! The binary reads it on start-up and creates any location whose code is not yet in
//! the store (see `core::location::seed_locations`).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire locations.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Locations to seed
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
}

/// Configuration for a single location
#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    /// Unique location code
    pub code: String,
    /// Type tag (e.g., "shelf", "pallet")
    pub location_type: String,
    /// Whether the location accepts items; defaults to true
    #[serde(default = "default_active")]
    pub active: bool,
    /// Optional minimum occupancy threshold
    pub min_threshold: Option<i64>,
    /// Optional maximum occupancy threshold
    pub max_threshold: Option<i64>,
}

const fn default_active() -> bool {
    true
}

/// Loads location configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse locations.toml: {e}"),
    })
}

/// Loads location configuration from the default location (./locations.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("locations.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_location_config() {
        let toml_str = r#"
            [[locations]]
            code = "A-01"
            location_type = "shelf"
            min_threshold = 5
            max_threshold = 50

            [[locations]]
            code = "DOCK"
            location_type = "staging"
            active = false
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.locations.len(), 2);
        assert_eq!(config.locations[0].code, "A-01");
        assert!(config.locations[0].active);
        assert_eq!(config.locations[0].max_threshold, Some(50));

        assert!(!config.locations[1].active);
        assert_eq!(config.locations[1].min_threshold, None);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }
}
