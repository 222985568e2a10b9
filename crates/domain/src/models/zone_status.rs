//! Per-device geofence presence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single durable "where is this device right now" row.
///
/// `zone_id == None` means the device is outside every zone. This is the
/// only mutable geofence state the engine owns, and it is always read and
/// written inside the per-device critical section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceStatus {
    pub device_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl GeofenceStatus {
    /// The initial state for a device never seen before.
    pub fn outside(device_id: Uuid) -> Self {
        Self {
            device_id,
            zone_id: None,
            entered_at: None,
            last_checked_at: None,
        }
    }

    /// The state after entering a zone at the given instant.
    pub fn inside(device_id: Uuid, zone_id: Uuid, entered_at: DateTime<Utc>) -> Self {
        Self {
            device_id,
            zone_id: Some(zone_id),
            entered_at: Some(entered_at),
            last_checked_at: Some(entered_at),
        }
    }

    pub fn is_inside(&self) -> bool {
        self.zone_id.is_some()
    }
}
