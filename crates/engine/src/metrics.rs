//! Pipeline metrics collection.

use metrics::counter;

/// Record an accepted position report.
pub fn record_position_accepted() {
    counter!("positions_accepted_total").increment(1);
}

/// Record a rejected position report with its reason.
pub fn record_position_rejected(reason: &'static str) {
    counter!("positions_rejected_total", "reason" => reason).increment(1);
}

/// Record a finalized trip.
pub fn record_trip_closed() {
    counter!("trips_closed_total").increment(1);
}

/// Record a committed geofence crossing event.
pub fn record_crossing(kind: &'static str) {
    counter!("geofence_crossings_total", "kind" => kind).increment(1);
}

/// Record an emitted speed violation alert.
pub fn record_speed_alert(severity: &'static str) {
    counter!("speed_alerts_total", "severity" => severity).increment(1);
}

/// Record a failed publish to the event sink.
pub fn record_sink_failure() {
    counter!("event_sink_failures_total").increment(1);
}

/// Record a zone lookup that failed open.
pub fn record_zone_lookup_failure() {
    counter!("zone_lookup_failures_total").increment(1);
}
