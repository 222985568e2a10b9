//! Geofence zone entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::zone::{ActiveWindow, GeofenceZone, ZoneShape};
use domain::EngineError;

/// Database row mapping for the geofence_zones table.
///
/// Geometry and the optional active window are stored as JSONB; the
/// shape_type column mirrors the geometry tag for cheap filtering.
#[derive(Debug, Clone, FromRow)]
pub struct ZoneEntity {
    pub id: Uuid,
    pub name: String,
    pub shape_type: String,
    pub geometry: serde_json::Value,
    pub priority: i32,
    pub active: bool,
    pub device_id: Option<Uuid>,
    pub active_window: Option<serde_json::Value>,
    pub speed_limit_kmh: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl ZoneEntity {
    /// Convert to domain model.
    ///
    /// Fails when the stored geometry does not parse; callers treat such
    /// rows as missing reference data (fail open).
    pub fn into_domain(self) -> Result<GeofenceZone, EngineError> {
        let shape: ZoneShape = serde_json::from_value(self.geometry).map_err(|e| {
            EngineError::ZoneLookup(format!("corrupt geometry for zone {}: {}", self.id, e))
        })?;

        let active_window = match self.active_window {
            Some(value) => Some(serde_json::from_value::<ActiveWindow>(value).map_err(|e| {
                EngineError::ZoneLookup(format!("corrupt window for zone {}: {}", self.id, e))
            })?),
            None => None,
        };

        Ok(GeofenceZone {
            id: self.id,
            name: self.name,
            shape,
            priority: self.priority,
            active: self.active,
            device_id: self.device_id,
            active_window,
            speed_limit_kmh: self.speed_limit_kmh,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entity() -> ZoneEntity {
        ZoneEntity {
            id: Uuid::new_v4(),
            name: "Depot".to_string(),
            shape_type: "circle".to_string(),
            geometry: serde_json::json!({
                "type": "circle",
                "latitude": 48.1486,
                "longitude": 17.1077,
                "radiusMeters": 250.0
            }),
            priority: 2,
            active: true,
            device_id: None,
            active_window: None,
            speed_limit_kmh: Some(30.0),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let entity = create_test_entity();
        let zone = entity.clone().into_domain().unwrap();

        assert_eq!(zone.id, entity.id);
        assert_eq!(zone.shape.kind(), "circle");
        assert_eq!(zone.priority, 2);
        assert_eq!(zone.speed_limit_kmh, Some(30.0));
        assert!(zone.shape.contains(48.1486, 17.1077));
    }

    #[test]
    fn test_entity_with_window() {
        let mut entity = create_test_entity();
        entity.active_window = Some(serde_json::json!({
            "weekdays": ["Mon", "Tue", "Wed", "Thu", "Fri"],
            "start": "08:00:00",
            "end": "17:00:00"
        }));

        let zone = entity.into_domain().unwrap();
        assert!(zone.active_window.is_some());
    }

    #[test]
    fn test_corrupt_geometry_is_an_error() {
        let mut entity = create_test_entity();
        entity.geometry = serde_json::json!({"type": "blob"});
        assert!(entity.into_domain().is_err());
    }
}
