//! Trip repository.
//!
//! Trips are keyed by (device_id, start_time). Re-deriving the same window
//! from more complete data must overwrite the existing row, so writes go
//! through INSERT ... ON CONFLICT DO UPDATE.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::Trip;
use domain::services::TripStore;
use domain::EngineError;

use crate::entities::trip::TripEntity;

/// Repository for trip records.
pub struct TripRepository {
    pool: PgPool,
}

impl TripRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TripStore for TripRepository {
    async fn upsert(&self, trip: &Trip) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO trips (
                device_id, start_time, end_time, distance_km, duration_seconds,
                avg_speed_kmh, max_speed_kmh,
                start_latitude, start_longitude, end_latitude, end_longitude, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (device_id, start_time) DO UPDATE SET
                end_time = EXCLUDED.end_time,
                distance_km = EXCLUDED.distance_km,
                duration_seconds = EXCLUDED.duration_seconds,
                avg_speed_kmh = EXCLUDED.avg_speed_kmh,
                max_speed_kmh = EXCLUDED.max_speed_kmh,
                end_latitude = EXCLUDED.end_latitude,
                end_longitude = EXCLUDED.end_longitude,
                source = EXCLUDED.source
            "#,
        )
        .bind(trip.device_id)
        .bind(trip.start_time)
        .bind(trip.end_time)
        .bind(trip.distance_km)
        .bind(trip.duration_seconds)
        .bind(trip.avg_speed_kmh)
        .bind(trip.max_speed_kmh)
        .bind(trip.start_latitude)
        .bind(trip.start_longitude)
        .bind(trip.end_latitude)
        .bind(trip.end_longitude)
        .bind(trip.source.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_device(
        &self,
        device_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Trip>, EngineError> {
        let entities = sqlx::query_as::<_, TripEntity>(
            r#"
            SELECT device_id, start_time, end_time, distance_km, duration_seconds,
                   avg_speed_kmh, max_speed_kmh,
                   start_latitude, start_longitude, end_latitude, end_longitude, source
            FROM trips
            WHERE device_id = $1 AND start_time < $3 AND end_time > $2
            ORDER BY start_time
            "#,
        )
        .bind(device_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(TripEntity::into_domain).collect())
    }
}
