//! Speed violation alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain_event::EventSeverity;

/// A detected in-zone speed violation.
///
/// Transient: alerts are pushed to the event sink and only a per
/// (device, zone) dedupe marker outlives the detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedViolationAlert {
    pub device_id: Uuid,
    pub geofence_id: Uuid,
    pub speed_kmh: f64,
    pub limit_kmh: f64,
    pub severity: EventSeverity,
    pub occurred_at: DateTime<Utc>,
}

impl SpeedViolationAlert {
    /// Builds an alert, classifying severity from the overage.
    pub fn new(
        device_id: Uuid,
        geofence_id: Uuid,
        speed_kmh: f64,
        limit_kmh: f64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            device_id,
            geofence_id,
            speed_kmh,
            limit_kmh,
            severity: EventSeverity::from_overage(speed_kmh - limit_kmh),
            occurred_at,
        }
    }

    /// How far above the limit the vehicle was, in km/h.
    pub fn overage_kmh(&self) -> f64 {
        self.speed_kmh - self.limit_kmh
    }
}
