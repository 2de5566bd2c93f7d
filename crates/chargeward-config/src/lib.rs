//! Configuration parsing and validation for chargeward
//!
//! Supports TOML (or JSON, by file extension) configuration with:
//! - Versioned schema
//! - Vehicle identification and evaluation settings
//! - Locations with geofenced, time-windowed charging schedules
//! - Validation with clear error messages

mod policy;
mod schema;
mod validation;

pub use policy::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a file.
///
/// Files ending in `.json` are read as JSON, everything else as TOML.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Policy> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    debug!(path = %path.display(), is_json, "Loading configuration");

    if is_json {
        parse_config_json(&content)
    } else {
        parse_config(&content)
    }
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Policy> {
    let raw: RawConfig = toml::from_str(content)?;
    finish(raw)
}

/// Parse and validate configuration from a JSON string
pub fn parse_config_json(content: &str) -> ConfigResult<Policy> {
    let raw: RawConfig = serde_json::from_str(content)?;
    finish(raw)
}

fn finish(raw: RawConfig) -> ConfigResult<Policy> {
    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    // Validate
    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    // Convert to policy
    Ok(Policy::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        config_version = 1

        [[locations]]
        name = "home"
        coordinates = { latitude = 37.0, longitude = -122.0 }

        [[locations.schedule]]
        start = "08:00"
        end = "09:00"
        valid_states = ["Charging"]
    "#;

    #[test]
    fn parse_minimal_config() {
        let policy = parse_config(MINIMAL).unwrap();
        assert_eq!(policy.locations.len(), 1);
        assert_eq!(policy.locations[0].id.as_str(), "home");
        assert_eq!(policy.settings, EvaluationSettings::default());
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_malformed_time_at_load() {
        let config = MINIMAL.replace("08:00", "8 o'clock");
        let result = parse_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationFailed { errors }) if errors.len() == 1));
    }

    #[test]
    fn reject_loosely_formatted_times_at_load() {
        for loose in ["8:00", "+8:+0", "08:0"] {
            let config = MINIMAL.replace("08:00", loose);
            let result = parse_config(&config);
            assert!(
                matches!(&result, Err(ConfigError::ValidationFailed { errors }) if errors.len() == 1),
                "{} was accepted",
                loose
            );
        }
    }

    #[test]
    fn reject_missing_coordinates() {
        let config = r#"
            config_version = 1

            [[locations]]
            name = "home"
        "#;

        assert!(matches!(parse_config(config), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn load_toml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("config.toml");
        std::fs::File::create(&toml_path)
            .unwrap()
            .write_all(MINIMAL.as_bytes())
            .unwrap();
        assert_eq!(load_config(&toml_path).unwrap().locations.len(), 1);

        let json_path = dir.path().join("config.json");
        let json = r#"{
            "config_version": 1,
            "settings": { "wake_max_attempts": 3 },
            "locations": [
                {
                    "coordinates": { "latitude": 37.0, "longitude": -122.0 },
                    "schedule": [
                        { "start": "08:00", "end": "09:00", "wake_up": true, "valid_states": ["Charging"] }
                    ]
                }
            ]
        }"#;
        std::fs::write(&json_path, json).unwrap();
        let policy = load_config(&json_path).unwrap();
        assert_eq!(policy.settings.wake_max_attempts, 3);
        assert_eq!(policy.locations[0].id.as_str(), "location-1");
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
