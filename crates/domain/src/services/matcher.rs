//! Pure geofence matching.
//!
//! Given a point and the full zone set, pick the best matching zone or
//! none. No I/O and no clock access: the caller supplies the instant, so
//! identical inputs always produce the identical winner.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::GeofenceZone;

/// Selects the best zone containing the given point, if any.
///
/// A zone is a candidate iff it is active, scoped to this device (or to
/// all devices), armed at `at`, and geometrically contains the point.
/// Among candidates the highest priority wins; ties break to the most
/// recently created zone, then by id so the result is total.
pub fn best_match<'a>(
    device_id: Uuid,
    latitude: f64,
    longitude: f64,
    at: DateTime<Utc>,
    zones: &'a [GeofenceZone],
) -> Option<&'a GeofenceZone> {
    zones
        .iter()
        .filter(|zone| zone.active)
        .filter(|zone| zone.applies_to(device_id))
        .filter(|zone| zone.armed_at(&at))
        .filter(|zone| zone.shape.contains(latitude, longitude))
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        })
}
