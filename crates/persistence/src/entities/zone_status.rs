//! Geofence status entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::GeofenceStatus;

/// Database row mapping for the geofence_status table (one row per device).
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceStatusEntity {
    pub device_id: Uuid,
    pub zone_id: Option<Uuid>,
    pub entered_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl GeofenceStatusEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> GeofenceStatus {
        GeofenceStatus {
            device_id: self.device_id,
            zone_id: self.zone_id,
            entered_at: self.entered_at,
            last_checked_at: self.last_checked_at,
        }
    }
}

impl From<GeofenceStatusEntity> for GeofenceStatus {
    fn from(entity: GeofenceStatusEntity) -> Self {
        entity.into_domain()
    }
}
