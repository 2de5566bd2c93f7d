//! Configuration validation

use crate::schema::{RawConfig, RawLocation, RawScheduleEntry, RawSettings};
use chargeward_util::{LocationId, WallClock};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Location '{location}': {message}")]
    LocationError { location: String, message: String },

    #[error("Duplicate location name: {0}")]
    DuplicateLocationName(String),

    #[error("Invalid time format '{value}': {message}")]
    InvalidTimeFormat { value: String, message: String },

    #[error(
        "Location '{location}': window {start}-{end} does not end after it starts \
         (windows crossing midnight are not supported)"
    )]
    WindowNotSameDay {
        location: String,
        start: String,
        end: String,
    },

    #[error("Invalid setting '{name}': {message}")]
    InvalidSetting { name: &'static str, message: String },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = validate_settings(&config.settings);

    // Unnamed locations take part under their positional names
    let mut seen_names = HashSet::new();
    for (index, location) in config.locations.iter().enumerate() {
        let name = location_name(location, index);
        if seen_names.contains(&name) {
            errors.push(ValidationError::DuplicateLocationName(name));
        } else {
            seen_names.insert(name);
        }
    }

    for (index, location) in config.locations.iter().enumerate() {
        errors.extend(validate_location(location, index));
    }

    errors
}

fn validate_settings(settings: &RawSettings) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(tolerance) = settings.geofence_tolerance_degrees
        && !(tolerance.is_finite() && tolerance > 0.0)
    {
        errors.push(ValidationError::InvalidSetting {
            name: "geofence_tolerance_degrees",
            message: format!("must be a positive number, got {}", tolerance),
        });
    }

    if settings.wake_poll_interval_seconds == Some(0) {
        errors.push(ValidationError::InvalidSetting {
            name: "wake_poll_interval_seconds",
            message: "must be at least 1".into(),
        });
    }

    if settings.wake_max_attempts == Some(0) {
        errors.push(ValidationError::InvalidSetting {
            name: "wake_max_attempts",
            message: "must be at least 1".into(),
        });
    }

    if let Some(rate) = settings.energy_rate_per_kwh
        && !(rate.is_finite() && rate >= 0.0)
    {
        errors.push(ValidationError::InvalidSetting {
            name: "energy_rate_per_kwh",
            message: format!("must be zero or positive, got {}", rate),
        });
    }

    if settings.cycle_interval_seconds == Some(0) {
        errors.push(ValidationError::InvalidSetting {
            name: "cycle_interval_seconds",
            message: "must be at least 1".into(),
        });
    }

    errors
}

fn validate_location(location: &RawLocation, index: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = location_name(location, index);

    if let Some(explicit) = &location.name
        && explicit.trim().is_empty()
    {
        errors.push(ValidationError::LocationError {
            location: name.clone(),
            message: "name cannot be empty".into(),
        });
    }

    let coords = &location.coordinates;
    if !(coords.latitude.is_finite() && (-90.0..=90.0).contains(&coords.latitude)) {
        errors.push(ValidationError::LocationError {
            location: name.clone(),
            message: format!("latitude {} is out of range", coords.latitude),
        });
    }
    if !(coords.longitude.is_finite() && (-180.0..=180.0).contains(&coords.longitude)) {
        errors.push(ValidationError::LocationError {
            location: name.clone(),
            message: format!("longitude {} is out of range", coords.longitude),
        });
    }

    for entry in &location.schedule {
        errors.extend(validate_schedule_entry(entry, &name));
    }

    errors
}

fn validate_schedule_entry(entry: &RawScheduleEntry, location: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let start = parse_time(&entry.start).map_err(|message| ValidationError::InvalidTimeFormat {
        value: entry.start.clone(),
        message,
    });
    let end = parse_time(&entry.end).map_err(|message| ValidationError::InvalidTimeFormat {
        value: entry.end.clone(),
        message,
    });

    match (start, end) {
        (Ok(start), Ok(end)) => {
            if start >= end {
                errors.push(ValidationError::WindowNotSameDay {
                    location: location.to_string(),
                    start: entry.start.clone(),
                    end: entry.end.clone(),
                });
            }
        }
        (start, end) => {
            errors.extend(start.err());
            errors.extend(end.err());
        }
    }

    if entry.valid_states.is_empty() {
        errors.push(ValidationError::LocationError {
            location: location.to_string(),
            message: format!(
                "window {}-{} must list at least one valid state",
                entry.start, entry.end
            ),
        });
    }

    if entry.valid_states.iter().any(|s| s.trim().is_empty()) {
        errors.push(ValidationError::LocationError {
            location: location.to_string(),
            message: format!("window {}-{} has an empty state label", entry.start, entry.end),
        });
    }

    errors
}

/// Display name of a raw location, explicit or positional
pub(crate) fn location_name(location: &RawLocation, index: usize) -> String {
    match &location.name {
        Some(name) => name.clone(),
        None => LocationId::positional(index).as_str().to_string(),
    }
}

/// Parse HH:MM time format (exactly two digits on each side)
pub fn parse_time(s: &str) -> Result<WallClock, String> {
    let (hour, minute) = s
        .split_once(':')
        .ok_or_else(|| "Expected HH:MM format".to_string())?;

    let two_digits = |field: &str| field.len() == 2 && field.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hour) || !two_digits(minute) {
        return Err("Expected HH:MM format".into());
    }

    let hour: u8 = hour.parse().map_err(|_| "Invalid hour".to_string())?;
    let minute: u8 = minute.parse().map_err(|_| "Invalid minute".to_string())?;

    if hour >= 24 {
        return Err("Hour must be 0-23".into());
    }
    if minute >= 60 {
        return Err("Minute must be 0-59".into());
    }

    WallClock::new(hour, minute).ok_or_else(|| "Invalid time of day".to_string())
}
