//! Geofence state tracker and crossing event emitter.
//!
//! A pure state-machine step: given the prior persisted status and the
//! current match result, produce the new status and the crossing events
//! to append. The pipeline commits both inside the per-device critical
//! section, so the decide/write pair is atomic per device.
//!
//! A direct zone-to-zone transition (Inside(Z1) with Z2 now matching)
//! emits EXIT(Z1) followed by ENTRY(Z2), so Z1's dwell time is never
//! silently lost.

use domain::models::zone_event::{CrossingKind, GeofenceEvent};
use domain::models::{GeofenceStatus, GeofenceZone, PositionReport};

/// Result of one state-machine step.
#[derive(Debug, Clone)]
pub struct CrossingOutcome {
    /// The status row to persist.
    pub status: GeofenceStatus,
    /// Zero, one, or two events (exit always precedes entry).
    pub events: Vec<GeofenceEvent>,
}

/// Computes the transition for one processed report.
pub fn step(
    prior: &GeofenceStatus,
    matched: Option<&GeofenceZone>,
    report: &PositionReport,
) -> CrossingOutcome {
    let now = report.recorded_at;
    let device_id = report.device_id;

    match (prior.zone_id, matched) {
        // Outside, still outside: refresh last-checked only.
        (None, None) => CrossingOutcome {
            status: GeofenceStatus {
                last_checked_at: Some(now),
                ..prior.clone()
            },
            events: vec![],
        },

        // Outside -> inside: entry.
        (None, Some(zone)) => CrossingOutcome {
            status: GeofenceStatus::inside(device_id, zone.id, now),
            events: vec![entry_event(report, zone)],
        },

        (Some(current), Some(zone)) if current == zone.id => {
            // Still inside the same zone: keep entered_at.
            CrossingOutcome {
                status: GeofenceStatus {
                    last_checked_at: Some(now),
                    ..prior.clone()
                },
                events: vec![],
            }
        }

        // Inside -> outside: exit with dwell duration.
        (Some(current), None) => CrossingOutcome {
            status: GeofenceStatus {
                device_id,
                zone_id: None,
                entered_at: None,
                last_checked_at: Some(now),
            },
            events: vec![exit_event(report, current, prior)],
        },

        // Inside Z1, Z2 matches: exit Z1, enter Z2.
        (Some(current), Some(zone)) => CrossingOutcome {
            status: GeofenceStatus::inside(device_id, zone.id, now),
            events: vec![exit_event(report, current, prior), entry_event(report, zone)],
        },
    }
}

fn entry_event(report: &PositionReport, zone: &GeofenceZone) -> GeofenceEvent {
    GeofenceEvent {
        event_key: GeofenceEvent::idempotency_key(
            report.device_id,
            CrossingKind::Entry,
            zone.id,
            report.recorded_at,
        ),
        device_id: report.device_id,
        geofence_id: zone.id,
        kind: CrossingKind::Entry,
        occurred_at: report.recorded_at,
        latitude: report.latitude,
        longitude: report.longitude,
        speed_kmh: report.speed_kmh,
        duration_inside_seconds: None,
    }
}

fn exit_event(
    report: &PositionReport,
    zone_id: uuid::Uuid,
    prior: &GeofenceStatus,
) -> GeofenceEvent {
    // entered_at can be absent on a hand-edited or pre-migration row; the
    // exit is still recorded, just without a duration.
    let duration_inside_seconds = prior
        .entered_at
        .map(|entered| (report.recorded_at - entered).num_seconds());

    GeofenceEvent {
        event_key: GeofenceEvent::idempotency_key(
            report.device_id,
            CrossingKind::Exit,
            zone_id,
            report.recorded_at,
        ),
        device_id: report.device_id,
        geofence_id: zone_id,
        kind: CrossingKind::Exit,
        occurred_at: report.recorded_at,
        latitude: report.latitude,
        longitude: report.longitude,
        speed_kmh: report.speed_kmh,
        duration_inside_seconds,
    }
}
