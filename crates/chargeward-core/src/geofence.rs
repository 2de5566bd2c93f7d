//! Geofencing against configured locations

use chargeward_api::Coordinate;
use chargeward_config::Location;

/// Answers which configured locations a position is at
///
/// A position is at a location when both latitude and longitude differ
/// from the location's coordinates by strictly less than the tolerance.
#[derive(Debug, Clone, Copy)]
pub struct GeofenceIndex<'a> {
    locations: &'a [Location],
    tolerance: f64,
}

impl<'a> GeofenceIndex<'a> {
    pub fn new(locations: &'a [Location], tolerance: f64) -> Self {
        Self {
            locations,
            tolerance,
        }
    }

    /// Every location containing `position`, in configuration order
    pub fn locate(&self, position: &Coordinate) -> Vec<&'a Location> {
        self.locations
            .iter()
            .filter(|l| self.contains(l, position))
            .collect()
    }

    /// Whether `position` is inside `location`'s fence
    pub fn contains(&self, location: &Location, position: &Coordinate) -> bool {
        location.coordinates.within(position, self.tolerance)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}
