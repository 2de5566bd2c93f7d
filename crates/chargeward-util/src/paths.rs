//! Default paths for chargeward components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/chargeward/config.toml` or `~/.config/chargeward/config.toml`
//! - Vehicle snapshot: `$XDG_STATE_HOME/chargeward/vehicle.json` or `~/.local/state/chargeward/vehicle.json`

use std::path::PathBuf;

/// Environment variable for overriding the config path
pub const CHARGEWARD_CONFIG_ENV: &str = "CHARGEWARD_CONFIG";

/// Application subdirectory name
const APP_DIR: &str = "chargeward";

const CONFIG_FILENAME: &str = "config.toml";

const SNAPSHOT_FILENAME: &str = "vehicle.json";

/// Get the default configuration file path.
///
/// Order of precedence:
/// 1. `$CHARGEWARD_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/chargeward/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/chargeward/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CHARGEWARD_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking CHARGEWARD_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"]).join(CONFIG_FILENAME)
}

/// Get the default vehicle snapshot path used by the service binary.
pub fn default_snapshot_path() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"]).join(SNAPSHOT_FILENAME)
}

fn xdg_dir(xdg_var: &str, home_fallback: &[&str]) -> PathBuf {
    if let Ok(dir) = std::env::var(xdg_var) {
        return PathBuf::from(dir).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        let mut path = PathBuf::from(home);
        path.extend(home_fallback);
        return path.join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_contains_app_dir() {
        let path = config_path_without_env();
        assert!(path.to_string_lossy().contains("chargeward"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn snapshot_path_contains_app_dir() {
        let path = default_snapshot_path();
        assert!(path.to_string_lossy().contains("chargeward"));
        assert!(path.to_string_lossy().ends_with("vehicle.json"));
    }
}
