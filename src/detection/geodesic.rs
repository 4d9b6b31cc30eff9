//! Great-circle distance on a spherical Earth

use crate::models::{Coordinates, LoginEvent};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the globe, latitude first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint { latitude, longitude }
    }

    /// Distance to `other` in kilometers
    pub fn great_circle_distance(&self, other: &GeoPoint) -> f64 {
        great_circle_distance(*self, *other)
    }
}

impl From<Coordinates> for GeoPoint {
    fn from(c: Coordinates) -> Self {
        GeoPoint::new(c.latitude, c.longitude)
    }
}

impl From<&LoginEvent> for GeoPoint {
    fn from(event: &LoginEvent) -> Self {
        GeoPoint::new(event.latitude, event.longitude)
    }
}

/// Calculate the great-circle distance between two points using the Haversine formula
/// Returns distance in kilometers
///
/// Coordinates are not range-checked; whatever the upstream proxy supplied is used as is.
pub fn great_circle_distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let lat1_rad = p1.latitude.to_radians();
    let lat2_rad = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + (delta_lon / 2.0).sin().powi(2) * lat1_rad.cos() * lat2_rad.cos();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
