//! Canonical geodesic distance.
//!
//! Every subsystem that measures distance on the globe (trip accumulation,
//! circle-zone containment) goes through this module. Using a single formula
//! keeps trip odometers and containment checks from drifting apart.

use geo::{point, HaversineDistance};

/// Geodesic distance between two WGS84 coordinates, in meters.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = point!(x: lon1, y: lat1);
    let b = point!(x: lon2, y: lat2);
    a.haversine_distance(&b)
}

/// Geodesic distance between two WGS84 coordinates, in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    distance_meters(lat1, lon1, lat2, lon2) / 1000.0
}
