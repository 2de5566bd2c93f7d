//! Config validation CLI tool
//!
//! Validates a chargeward configuration file and reports any errors.

use chargeward_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a chargeward configuration file (TOML, or JSON by extension).");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            eprintln!("  validate-config config.example.toml");
            return ExitCode::from(2);
        }
    };

    // Check file exists
    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    // Try to load and validate
    match chargeward_config::load_config(&config_path) {
        Ok(policy) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", chargeward_config::CURRENT_CONFIG_VERSION);
            if let Some(name) = &policy.vehicle.name {
                println!("  Vehicle: {}", name);
            }
            println!("  Locations: {}", policy.locations.len());
            println!("  Windows: {}", policy.window_count());

            if !policy.locations.is_empty() {
                println!();
                println!("Locations:");
                for location in &policy.locations {
                    println!("  - {} at {}", location.id, location.coordinates);
                    for entry in &location.schedule {
                        let states: Vec<&str> =
                            entry.valid_states.iter().map(|s| s.as_str()).collect();
                        println!(
                            "      {}{} valid: {}",
                            entry.window,
                            if entry.wake_up { " [wake]" } else { "" },
                            states.join(", ")
                        );
                    }
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                chargeward_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                chargeward_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                chargeward_config::ConfigError::JsonParseError(parse_err) => {
                    eprintln!("JSON parse error:");
                    eprintln!("  {}", parse_err);
                }
                chargeward_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                chargeward_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        chargeward_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
