//! Trip domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How a trip record entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripSource {
    /// Derived from the live position stream.
    Stream,
    /// Derived from a historical replay.
    Backfill,
}

impl TripSource {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TripSource::Stream => "stream",
            TripSource::Backfill => "backfill",
        }
    }
}

impl fmt::Display for TripSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TripSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stream" => Ok(TripSource::Stream),
            "backfill" => Ok(TripSource::Backfill),
            _ => Err(format!(
                "Invalid trip source: {}. Must be one of: stream, backfill",
                s
            )),
        }
    }
}

/// A finalized trip derived from the position stream.
///
/// Trips are keyed by `(device_id, start_time)`: re-deriving the same window
/// from more complete data overwrites the existing row, never duplicates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub device_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distance_km: f64,
    pub duration_seconds: i64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
    pub source: TripSource,
}

impl Trip {
    /// The natural upsert key for this trip.
    pub fn key(&self) -> (Uuid, DateTime<Utc>) {
        (self.device_id, self.start_time)
    }

    /// Checks the structural invariants every emitted trip must satisfy.
    pub fn is_well_formed(&self) -> bool {
        self.end_time > self.start_time && self.distance_km >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trip() -> Trip {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        Trip {
            device_id: Uuid::new_v4(),
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            distance_km: 12.4,
            duration_seconds: 1800,
            avg_speed_kmh: 24.8,
            max_speed_kmh: 70.0,
            start_latitude: 48.1486,
            start_longitude: 17.1077,
            end_latitude: 48.2082,
            end_longitude: 16.3738,
            source: TripSource::Stream,
        }
    }

    #[test]
    fn test_trip_source_round_trip() {
        assert_eq!("stream".parse::<TripSource>().unwrap(), TripSource::Stream);
        assert_eq!(
            "backfill".parse::<TripSource>().unwrap(),
            TripSource::Backfill
        );
        assert!("live".parse::<TripSource>().is_err());
        assert_eq!(TripSource::Backfill.to_string(), "backfill");
    }

    #[test]
    fn test_trip_key() {
        let trip = sample_trip();
        assert_eq!(trip.key(), (trip.device_id, trip.start_time));
    }

    #[test]
    fn test_well_formed() {
        let trip = sample_trip();
        assert!(trip.is_well_formed());

        let mut inverted = sample_trip();
        inverted.end_time = inverted.start_time;
        assert!(!inverted.is_well_formed());

        let mut negative = sample_trip();
        negative.distance_km = -0.1;
        assert!(!negative.is_well_formed());
    }

    #[test]
    fn test_trip_serializes_camel_case() {
        let json = serde_json::to_string(&sample_trip()).unwrap();
        assert!(json.contains("\"distanceKm\""));
        assert!(json.contains("\"maxSpeedKmh\""));
        assert!(json.contains("\"source\":\"stream\""));
    }
}
