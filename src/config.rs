use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::detection::travel_validator::{DEFAULT_MAX_ALLOWED_SPEED_KMH, DEFAULT_MAX_EVENTS};
use crate::detection::ValidatorConfig;
use crate::input::headers::{AUTHORIZATION_HEADER, LATITUDE_HEADER, LONGITUDE_HEADER};
use crate::input::GeoHeaderExtractor;

/// Errors that can occur while loading or saving the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for travelguard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Travel validation configuration
    pub validator: ValidatorSettings,
    /// Request header names
    pub headers: HeaderConfig,
    /// Output configuration
    pub output: OutputConfig,
}

/// Travel validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Maximum plausible travel speed in km/h (0 keeps the default)
    pub max_allowed_speed_kmh: f64,
    /// Maximum number of logins compared per identity
    pub max_events: usize,
}

/// Names of the headers read from inbound requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub authorization_header: String,
    pub longitude_header: String,
    pub latitude_header: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json", "jsonl", or "console"
    pub format: String,
    /// Output file path (stdout if unset)
    pub file_path: Option<PathBuf>,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        ValidatorSettings {
            max_allowed_speed_kmh: DEFAULT_MAX_ALLOWED_SPEED_KMH,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        HeaderConfig {
            authorization_header: AUTHORIZATION_HEADER.to_string(),
            longitude_header: LONGITUDE_HEADER.to_string(),
            latitude_header: LATITUDE_HEADER.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: "console".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validator settings, run through the same override rules as code callers
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig::builder()
            .with_max_allowed_speed(self.validator.max_allowed_speed_kmh)
            .with_max_events(self.validator.max_events)
            .build()
    }

    pub fn geo_header_extractor(&self) -> GeoHeaderExtractor {
        GeoHeaderExtractor::new(
            self.headers.longitude_header.clone(),
            self.headers.latitude_header.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let validator = config.validator_config();
        assert_eq!(validator.max_allowed_speed_kmh(), 10.0);
        assert_eq!(validator.max_events(), DEFAULT_MAX_EVENTS);
        assert_eq!(config.headers.longitude_header, "Cf-Iplongitude");
        assert_eq!(config.output.format, "console");
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("travelguard.toml");

        let mut config = Config::default();
        config.validator.max_allowed_speed_kmh = 900.0;
        config.output.file_path = Some(PathBuf::from("reports.jsonl"));
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.validator.max_allowed_speed_kmh, 900.0);
        assert_eq!(loaded.output.file_path, Some(PathBuf::from("reports.jsonl")));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [validator]
            max_allowed_speed_kmh = 250.0
            "#,
        )
        .unwrap();
        assert_eq!(config.validator.max_allowed_speed_kmh, 250.0);
        assert_eq!(config.validator.max_events, DEFAULT_MAX_EVENTS);
        assert_eq!(config.headers.latitude_header, "Cf-Iplatitude");
    }

    #[test]
    fn test_zero_speed_in_file_keeps_default() {
        let config: Config = toml::from_str(
            r#"
            [validator]
            max_allowed_speed_kmh = 0.0
            max_events = 0
            "#,
        )
        .unwrap();
        let validator = config.validator_config();
        assert_eq!(validator.max_allowed_speed_kmh(), DEFAULT_MAX_ALLOWED_SPEED_KMH);
        assert_eq!(validator.max_events(), DEFAULT_MAX_EVENTS);
    }

    #[test]
    fn test_custom_header_names() {
        let config: Config = toml::from_str(
            r#"
            [headers]
            longitude_header = "X-Geo-Lon"
            latitude_header = "X-Geo-Lat"
            "#,
        )
        .unwrap();
        let extractor = config.geo_header_extractor();
        assert_eq!(extractor.longitude_header(), "X-Geo-Lon");
        assert_eq!(extractor.latitude_header(), "X-Geo-Lat");
        assert_eq!(config.headers.authorization_header, "Authorization");
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[validator\nmax_allowed_speed_kmh = ").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::from_file("/nonexistent/travelguard.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
