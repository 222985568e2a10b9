//! Common validation utilities for position fields.

use chrono::{DateTime, TimeZone, Utc};
use validator::ValidationError;

/// Maximum plausible road speed in km/h. Anything above this is a GPS glitch.
pub const MAX_SPEED_KMH: f64 = 300.0;

/// Maximum allowed future timestamp tolerance in seconds (5 minutes for clock skew).
pub const MAX_FUTURE_TOLERANCE_SECS: i64 = 300;

/// Reports timestamped before this instant are considered corrupt.
/// 2000-01-01T00:00:00Z, well before any tracker in the fleet shipped.
pub const EPOCH_FLOOR_SECS: i64 = 946_684_800;

/// The earliest timestamp accepted from a tracker.
pub fn epoch_floor() -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH_FLOOR_SECS, 0).unwrap()
}

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that a speed is within plausible range (0 to 300 km/h).
pub fn validate_speed_kmh(speed: f64) -> Result<(), ValidationError> {
    if (0.0..=MAX_SPEED_KMH).contains(&speed) {
        Ok(())
    } else {
        let mut err = ValidationError::new("speed_range");
        err.message = Some("Speed must be between 0 and 300 km/h".into());
        Err(err)
    }
}

/// Validates that a heading is within valid range (0 to 360).
pub fn validate_heading(heading: f64) -> Result<(), ValidationError> {
    if (0.0..=360.0).contains(&heading) {
        Ok(())
    } else {
        let mut err = ValidationError::new("heading_range");
        err.message = Some("Heading must be between 0 and 360".into());
        Err(err)
    }
}

/// Validates that battery level is within valid range (0 to 100).
pub fn validate_battery_level(level: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&level) {
        Ok(())
    } else {
        let mut err = ValidationError::new("battery_range");
        err.message = Some("Battery level must be between 0 and 100".into());
        Err(err)
    }
}
