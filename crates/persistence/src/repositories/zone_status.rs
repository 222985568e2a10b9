//! Geofence status repository.
//!
//! One row per device. All reads and writes happen inside the engine's
//! per-device critical section, so the upsert here does not need its own
//! optimistic-concurrency check.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::GeofenceStatus;
use domain::services::StatusStore;
use domain::EngineError;

use crate::entities::zone_status::GeofenceStatusEntity;

/// Repository for per-device geofence status.
pub struct GeofenceStatusRepository {
    pool: PgPool,
}

impl GeofenceStatusRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl StatusStore for GeofenceStatusRepository {
    async fn get(&self, device_id: Uuid) -> Result<Option<GeofenceStatus>, EngineError> {
        let entity = sqlx::query_as::<_, GeofenceStatusEntity>(
            r#"
            SELECT device_id, zone_id, entered_at, last_checked_at
            FROM geofence_status
            WHERE device_id = $1
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(GeofenceStatusEntity::into_domain))
    }

    async fn put(&self, status: &GeofenceStatus) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO geofence_status (device_id, zone_id, entered_at, last_checked_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (device_id) DO UPDATE SET
                zone_id = EXCLUDED.zone_id,
                entered_at = EXCLUDED.entered_at,
                last_checked_at = EXCLUDED.last_checked_at
            "#,
        )
        .bind(status.device_id)
        .bind(status.zone_id)
        .bind(status.entered_at)
        .bind(status.last_checked_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
