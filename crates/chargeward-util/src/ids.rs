//! Strongly-typed identifiers for chargeward

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name of a configured charging location
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Name used for locations configured without one (1-based position)
    pub fn positional(index: usize) -> Self {
        Self(format!("location-{}", index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for LocationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LocationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for one evaluation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(Uuid);

impl CycleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_id_equality() {
        let id1 = LocationId::new("home");
        let id2 = LocationId::new("home");
        let id3 = LocationId::new("office");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn positional_names_are_one_based() {
        assert_eq!(LocationId::positional(0).as_str(), "location-1");
        assert_eq!(LocationId::positional(4).as_str(), "location-5");
    }

    #[test]
    fn cycle_id_uniqueness() {
        let c1 = CycleId::new();
        let c2 = CycleId::new();
        assert_ne!(c1, c2);
    }

    #[test]
    fn ids_serialize_deserialize() {
        let location = LocationId::new("home");
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, "\"home\"");
        let parsed: LocationId = serde_json::from_str(&json).unwrap();
        assert_eq!(location, parsed);

        let cycle = CycleId::new();
        let json = serde_json::to_string(&cycle).unwrap();
        let parsed: CycleId = serde_json::from_str(&json).unwrap();
        assert_eq!(cycle, parsed);
    }
}
