//! Domain events pushed to the downstream event sink.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::zone::GeofenceZone;
use super::zone_event::{CrossingKind, GeofenceEvent};
use super::speed_alert::SpeedViolationAlert;

/// Severity attached to a domain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl EventSeverity {
    /// Classifies a speed overage (km/h above the limit).
    /// More than 40 over is critical, more than 20 is error, the rest warn.
    pub fn from_overage(overage_kmh: f64) -> Self {
        if overage_kmh > 40.0 {
            EventSeverity::Critical
        } else if overage_kmh > 20.0 {
            EventSeverity::Error
        } else {
            EventSeverity::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventSeverity::Info => "info",
            EventSeverity::Warning => "warning",
            EventSeverity::Error => "error",
            EventSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of occurrence a domain event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEventType {
    GeofenceEntry,
    GeofenceExit,
    SpeedViolation,
}

impl DomainEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainEventType::GeofenceEntry => "geofence_entry",
            DomainEventType::GeofenceExit => "geofence_exit",
            DomainEventType::SpeedViolation => "speed_violation",
        }
    }
}

/// Structured record describing a detected occurrence, consumed by
/// dashboards, narration, and push/email fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub device_id: Uuid,
    pub event_type: DomainEventType,
    pub severity: EventSeverity,
    pub title: String,
    pub description: String,
    pub metadata: serde_json::Value,
    pub latitude: f64,
    pub longitude: f64,
}

impl DomainEvent {
    /// Builds the domain event for a detected crossing.
    pub fn from_crossing(event: &GeofenceEvent, zone: &GeofenceZone) -> Self {
        let (event_type, title, description) = match event.kind {
            CrossingKind::Entry => (
                DomainEventType::GeofenceEntry,
                format!("Entered {}", zone.name),
                format!("Device entered zone \"{}\"", zone.name),
            ),
            CrossingKind::Exit => (
                DomainEventType::GeofenceExit,
                format!("Exited {}", zone.name),
                match event.duration_inside_seconds {
                    Some(secs) => format!(
                        "Device exited zone \"{}\" after {} seconds inside",
                        zone.name, secs
                    ),
                    None => format!("Device exited zone \"{}\"", zone.name),
                },
            ),
        };

        Self {
            device_id: event.device_id,
            event_type,
            severity: EventSeverity::Info,
            title,
            description,
            metadata: serde_json::json!({
                "zoneId": zone.id,
                "zoneName": zone.name,
                "zoneType": zone.shape.kind(),
                "occurredAt": event.occurred_at,
                "durationInsideSeconds": event.duration_inside_seconds,
                "speedKmh": event.speed_kmh,
            }),
            latitude: event.latitude,
            longitude: event.longitude,
        }
    }

    /// Builds the domain event for a speed violation.
    pub fn from_speed_violation(
        alert: &SpeedViolationAlert,
        zone: &GeofenceZone,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            device_id: alert.device_id,
            event_type: DomainEventType::SpeedViolation,
            severity: alert.severity,
            title: format!("Speeding in {}", zone.name),
            description: format!(
                "Device was doing {:.0} km/h in zone \"{}\" (limit {:.0} km/h)",
                alert.speed_kmh, zone.name, alert.limit_kmh
            ),
            metadata: serde_json::json!({
                "zoneId": zone.id,
                "zoneName": zone.name,
                "zoneType": zone.shape.kind(),
                "occurredAt": alert.occurred_at,
                "speedKmh": alert.speed_kmh,
                "limitKmh": alert.limit_kmh,
                "overageKmh": alert.overage_kmh(),
            }),
            latitude,
            longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::zone::ZoneShape;
    use chrono::Utc;

    fn zone() -> GeofenceZone {
        GeofenceZone {
            id: Uuid::new_v4(),
            name: "Depot".to_string(),
            shape: ZoneShape::Circle {
                latitude: 48.0,
                longitude: 17.0,
                radius_meters: 200.0,
            },
            priority: 0,
            active: true,
            device_id: None,
            active_window: None,
            speed_limit_kmh: Some(30.0),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_severity_from_overage_boundaries() {
        assert_eq!(EventSeverity::from_overage(5.0), EventSeverity::Warning);
        assert_eq!(EventSeverity::from_overage(20.0), EventSeverity::Warning);
        assert_eq!(EventSeverity::from_overage(20.5), EventSeverity::Error);
        assert_eq!(EventSeverity::from_overage(40.0), EventSeverity::Error);
        assert_eq!(EventSeverity::from_overage(40.5), EventSeverity::Critical);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(EventSeverity::Info < EventSeverity::Warning);
        assert!(EventSeverity::Warning < EventSeverity::Error);
        assert!(EventSeverity::Error < EventSeverity::Critical);
    }

    #[test]
    fn test_entry_event_payload() {
        let zone = zone();
        let event = GeofenceEvent {
            event_key: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            geofence_id: zone.id,
            kind: CrossingKind::Entry,
            occurred_at: Utc::now(),
            latitude: 48.0,
            longitude: 17.0,
            speed_kmh: 12.0,
            duration_inside_seconds: None,
        };

        let domain_event = DomainEvent::from_crossing(&event, &zone);
        assert_eq!(domain_event.event_type, DomainEventType::GeofenceEntry);
        assert_eq!(domain_event.severity, EventSeverity::Info);
        assert_eq!(domain_event.metadata["zoneName"], "Depot");
        assert_eq!(domain_event.metadata["zoneType"], "circle");
    }

    #[test]
    fn test_exit_event_mentions_duration() {
        let zone = zone();
        let event = GeofenceEvent {
            event_key: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            geofence_id: zone.id,
            kind: CrossingKind::Exit,
            occurred_at: Utc::now(),
            latitude: 48.0,
            longitude: 17.0,
            speed_kmh: 12.0,
            duration_inside_seconds: Some(420),
        };

        let domain_event = DomainEvent::from_crossing(&event, &zone);
        assert_eq!(domain_event.event_type, DomainEventType::GeofenceExit);
        assert!(domain_event.description.contains("420 seconds"));
    }

    #[test]
    fn test_speed_violation_payload() {
        let zone = zone();
        let alert =
            SpeedViolationAlert::new(Uuid::new_v4(), zone.id, 75.0, 30.0, Utc::now());
        let domain_event = DomainEvent::from_speed_violation(&alert, &zone, 48.0, 17.0);
        assert_eq!(domain_event.event_type, DomainEventType::SpeedViolation);
        assert_eq!(domain_event.severity, EventSeverity::Critical);
        assert_eq!(domain_event.metadata["limitKmh"], 30.0);
    }
}
