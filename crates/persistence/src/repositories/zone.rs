//! Geofence zone repository (read-only reference data).

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use domain::models::GeofenceZone;
use domain::services::ZoneProvider;
use domain::EngineError;

use crate::entities::zone::ZoneEntity;

/// Repository for admin-managed geofence zones.
pub struct ZoneRepository {
    pool: PgPool,
}

impl ZoneRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ZoneProvider for ZoneRepository {
    async fn zones_for_device(&self, device_id: Uuid) -> Result<Vec<GeofenceZone>, EngineError> {
        let entities = sqlx::query_as::<_, ZoneEntity>(
            r#"
            SELECT id, name, shape_type, geometry, priority, active,
                   device_id, active_window, speed_limit_kmh, created_at
            FROM geofence_zones
            WHERE active AND (device_id IS NULL OR device_id = $1)
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        // Rows with corrupt geometry are skipped, not fatal: a broken zone
        // must never block trip segmentation for the whole device.
        let zones = entities
            .into_iter()
            .filter_map(|entity| match entity.into_domain() {
                Ok(zone) => Some(zone),
                Err(err) => {
                    warn!(%device_id, "skipping unusable zone: {}", err);
                    None
                }
            })
            .collect();

        Ok(zones)
    }
}
