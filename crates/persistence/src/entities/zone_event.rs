//! Geofence event entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::zone_event::{CrossingKind, GeofenceEvent};

/// Database row mapping for the geofence_events table.
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceEventEntity {
    pub event_key: Uuid,
    pub device_id: Uuid,
    pub geofence_id: Uuid,
    pub kind: String,
    pub occurred_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub duration_inside_seconds: Option<i64>,
}

impl GeofenceEventEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> GeofenceEvent {
        let kind = CrossingKind::parse(&self.kind).unwrap_or(CrossingKind::Entry);

        GeofenceEvent {
            event_key: self.event_key,
            device_id: self.device_id,
            geofence_id: self.geofence_id,
            kind,
            occurred_at: self.occurred_at,
            latitude: self.latitude,
            longitude: self.longitude,
            speed_kmh: self.speed_kmh,
            duration_inside_seconds: self.duration_inside_seconds,
        }
    }
}

impl From<GeofenceEventEntity> for GeofenceEvent {
    fn from(entity: GeofenceEventEntity) -> Self {
        entity.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let entity = GeofenceEventEntity {
            event_key: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            geofence_id: Uuid::new_v4(),
            kind: "exit".to_string(),
            occurred_at: Utc::now(),
            latitude: 48.1,
            longitude: 17.1,
            speed_kmh: 35.0,
            duration_inside_seconds: Some(600),
        };

        let event: GeofenceEvent = entity.clone().into();
        assert_eq!(event.kind, CrossingKind::Exit);
        assert_eq!(event.duration_inside_seconds, Some(600));
        assert_eq!(event.event_key, entity.event_key);
    }
}
