//! Geofence event repository.
//!
//! Append-only log. The event_key column is unique, so a redelivered
//! detection collapses into the existing row instead of duplicating it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::GeofenceEvent;
use domain::services::EventStore;
use domain::EngineError;

use crate::entities::zone_event::GeofenceEventEntity;

/// Repository for geofence crossing events.
pub struct GeofenceEventRepository {
    pool: PgPool,
}

impl GeofenceEventRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventStore for GeofenceEventRepository {
    async fn append(&self, event: &GeofenceEvent) -> Result<bool, EngineError> {
        let result = sqlx::query(
            r#"
            INSERT INTO geofence_events (
                event_key, device_id, geofence_id, kind, occurred_at,
                latitude, longitude, speed_kmh, duration_inside_seconds
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (event_key) DO NOTHING
            "#,
        )
        .bind(event.event_key)
        .bind(event.device_id)
        .bind(event.geofence_id)
        .bind(event.kind.as_str())
        .bind(event.occurred_at)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.speed_kmh)
        .bind(event.duration_inside_seconds)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_device(
        &self,
        device_id: Uuid,
        geofence_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<GeofenceEvent>, EngineError> {
        let entities = if let Some(zone_id) = geofence_id {
            sqlx::query_as::<_, GeofenceEventEntity>(
                r#"
                SELECT event_key, device_id, geofence_id, kind, occurred_at,
                       latitude, longitude, speed_kmh, duration_inside_seconds
                FROM geofence_events
                WHERE device_id = $1 AND geofence_id = $2
                  AND occurred_at >= $3 AND occurred_at <= $4
                ORDER BY occurred_at DESC
                "#,
            )
            .bind(device_id)
            .bind(zone_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, GeofenceEventEntity>(
                r#"
                SELECT event_key, device_id, geofence_id, kind, occurred_at,
                       latitude, longitude, speed_kmh, duration_inside_seconds
                FROM geofence_events
                WHERE device_id = $1
                  AND occurred_at >= $2 AND occurred_at <= $3
                ORDER BY occurred_at DESC
                "#,
            )
            .bind(device_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(entities
            .into_iter()
            .map(GeofenceEventEntity::into_domain)
            .collect())
    }
}
