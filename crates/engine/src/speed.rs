//! In-zone speed violation detection.
//!
//! Runs after the crossing step, against the zone the device is inside of
//! after the transition. Repeated violations in the same (device, zone)
//! pair are suppressed for a configurable window so a sustained overspeed
//! produces one alert, not one per report. The window holds across exit
//! and re-entry, otherwise boundary GPS flapping would defeat it.
//!
//! The marker is in-memory only: an engine restart inside the window can
//! re-alert once. Alerts are transient by design, so that duplicate is
//! tolerated rather than paid for with a persisted marker row.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use domain::models::{GeofenceZone, PositionReport, SpeedViolationAlert};

/// Per-device speed violation detector with alert suppression.
#[derive(Debug)]
pub struct SpeedViolationDetector {
    suppression: Duration,
    last_alert: HashMap<Uuid, DateTime<Utc>>,
}

impl SpeedViolationDetector {
    pub fn new(suppression_secs: i64) -> Self {
        Self {
            suppression: Duration::seconds(suppression_secs),
            last_alert: HashMap::new(),
        }
    }

    /// Evaluates one report against the zone the device occupies.
    ///
    /// Returns an alert when the reported speed exceeds the zone's limit
    /// and no alert for that zone was emitted within the suppression
    /// window. Zones without a speed limit never alert.
    pub fn check(
        &mut self,
        report: &PositionReport,
        zone: &GeofenceZone,
    ) -> Option<SpeedViolationAlert> {
        let limit = zone.speed_limit_kmh?;
        if report.speed_kmh <= limit {
            return None;
        }

        if let Some(last) = self.last_alert.get(&zone.id) {
            if report.recorded_at - *last < self.suppression {
                return None;
            }
        }

        self.last_alert.insert(zone.id, report.recorded_at);
        Some(SpeedViolationAlert::new(
            report.device_id,
            zone.id,
            report.speed_kmh,
            limit,
            report.recorded_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::models::zone::ZoneShape;
    use domain::models::{EventSeverity, IgnitionState};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn zone(limit: Option<f64>) -> GeofenceZone {
        GeofenceZone {
            id: Uuid::new_v4(),
            name: "School Zone".to_string(),
            shape: ZoneShape::Circle {
                latitude: 48.15,
                longitude: 17.11,
                radius_meters: 400.0,
            },
            priority: 0,
            active: true,
            device_id: None,
            active_window: None,
            speed_limit_kmh: limit,
            created_at: t0(),
        }
    }

    fn report(speed_kmh: f64, at: DateTime<Utc>) -> PositionReport {
        PositionReport {
            device_id: Uuid::new_v4(),
            recorded_at: at,
            latitude: 48.15,
            longitude: 17.11,
            speed_kmh,
            ignition: IgnitionState::On,
            battery_level: None,
            heading: None,
        }
    }

    #[test]
    fn test_no_limit_no_alert() {
        let mut detector = SpeedViolationDetector::new(300);
        assert!(detector.check(&report(120.0, t0()), &zone(None)).is_none());
    }

    #[test]
    fn test_at_limit_is_not_a_violation() {
        let mut detector = SpeedViolationDetector::new(300);
        assert!(detector.check(&report(50.0, t0()), &zone(Some(50.0))).is_none());
    }

    #[test]
    fn test_violation_severity_tiers() {
        let z = zone(Some(50.0));
        let mut detector = SpeedViolationDetector::new(0);

        let warning = detector.check(&report(65.0, t0()), &z).unwrap();
        assert_eq!(warning.severity, EventSeverity::Warning);

        let error = detector
            .check(&report(75.0, t0() + Duration::seconds(1)), &z)
            .unwrap();
        assert_eq!(error.severity, EventSeverity::Error);

        let critical = detector
            .check(&report(95.0, t0() + Duration::seconds(2)), &z)
            .unwrap();
        assert_eq!(critical.severity, EventSeverity::Critical);
    }

    #[test]
    fn test_repeat_within_window_suppressed() {
        let z = zone(Some(50.0));
        let mut detector = SpeedViolationDetector::new(300);

        assert!(detector.check(&report(70.0, t0()), &z).is_some());
        // 2 minutes later: still suppressed.
        assert!(detector
            .check(&report(72.0, t0() + Duration::minutes(2)), &z)
            .is_none());
        // 6 minutes after the first alert: window expired.
        assert!(detector
            .check(&report(71.0, t0() + Duration::minutes(6)), &z)
            .is_some());
    }

    #[test]
    fn test_suppression_is_per_zone() {
        let z1 = zone(Some(50.0));
        let z2 = zone(Some(30.0));
        let mut detector = SpeedViolationDetector::new(300);

        assert!(detector.check(&report(70.0, t0()), &z1).is_some());
        assert!(detector
            .check(&report(70.0, t0() + Duration::seconds(5)), &z2)
            .is_some());
    }

    #[test]
    fn test_suppression_is_per_device() {
        let z = zone(Some(50.0));
        let mut first = SpeedViolationDetector::new(300);
        let mut second = SpeedViolationDetector::new(300);

        assert!(first.check(&report(70.0, t0()), &z).is_some());
        assert!(second
            .check(&report(70.0, t0() + Duration::seconds(5)), &z)
            .is_some());
    }
}
