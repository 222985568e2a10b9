//! Trip entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::trip::{Trip, TripSource};

/// Database row mapping for the trips table.
#[derive(Debug, Clone, FromRow)]
pub struct TripEntity {
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
    pub source: String,
}

impl TripEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> Trip {
        let source = self.source.parse::<TripSource>().unwrap_or(TripSource::Stream);

        Trip {
            device_id: self.device_id,
            start_time: self.start_time,
            end_time: self.end_time,
            distance_km: self.distance_km,
            duration_seconds: self.duration_seconds,
            avg_speed_kmh: self.avg_speed_kmh,
            max_speed_kmh: self.max_speed_kmh,
            start_latitude: self.start_latitude,
            start_longitude: self.start_longitude,
            end_latitude: self.end_latitude,
            end_longitude: self.end_longitude,
            source,
        }
    }
}

impl From<TripEntity> for Trip {
    fn from(entity: TripEntity) -> Self {
        entity.into_domain()
    }
}
