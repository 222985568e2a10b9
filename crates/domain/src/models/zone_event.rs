//! Geofence crossing events (append-only log).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Width of the idempotency time bucket. Two detections of the same
/// crossing within one bucket collapse to one row under at-least-once
/// upstream delivery.
const EVENT_KEY_BUCKET_SECS: i64 = 60;

/// Geofence crossing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossingKind {
    Entry,
    Exit,
}

impl CrossingKind {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossingKind::Entry => "entry",
            CrossingKind::Exit => "exit",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(CrossingKind::Entry),
            "exit" => Some(CrossingKind::Exit),
            _ => None,
        }
    }
}

impl fmt::Display for CrossingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected geofence crossing. Written exactly once per transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEvent {
    /// Deterministic idempotency key over (device, kind, zone, time bucket).
    pub event_key: Uuid,
    pub device_id: Uuid,
    pub geofence_id: Uuid,
    pub kind: CrossingKind,
    pub occurred_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    /// Seconds spent inside the zone; present on exit events only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_inside_seconds: Option<i64>,
}

impl GeofenceEvent {
    /// Derives the natural idempotency key for a crossing.
    ///
    /// The key is a v5 UUID over (device, kind, zone, minute bucket), so a
    /// redelivered report that re-detects the same crossing maps to the
    /// same row.
    pub fn idempotency_key(
        device_id: Uuid,
        kind: CrossingKind,
        geofence_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> Uuid {
        let bucket = occurred_at.timestamp().div_euclid(EVENT_KEY_BUCKET_SECS);
        let name = format!(
            "geofence-event:{}:{}:{}:{}",
            device_id,
            kind.as_str(),
            geofence_id,
            bucket
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }
}
