//! The derivation pipeline.
//!
//! One entry point, `process`, runs a validated report through every
//! stage while holding the device's lock:
//!
//!   Validate -> Segment -> MatchZone -> DetectCrossing
//!            -> DetectSpeedViolation -> Persist -> Publish
//!
//! Failure policy:
//!   - zone lookup errors fail open: the geofence stages are skipped for
//!     this report, trip segmentation still runs;
//!   - event sink failures are logged and counted, never propagated;
//!   - storage errors on trips, statuses, and events propagate to the
//!     caller, who decides whether to retry the whole report.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use domain::models::{
    DomainEvent, GeofenceEvent, GeofenceStatus, PositionReport, SpeedViolationAlert, Trip,
    TripSource,
};
use domain::services::{best_match, EventSink, EventStore, StatusStore, TripStore, ZoneProvider};
use domain::EngineError;

use crate::config::EngineSettings;
use crate::metrics;
use crate::registry::{DeviceRegistry, DeviceState};
use crate::validator::{self, RejectReason};

/// What one report produced.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    pub rejected: Option<RejectReason>,
    pub closed_trip: Option<Trip>,
    /// Crossing events newly committed by this report (duplicates by
    /// idempotency key are not listed).
    pub crossings: Vec<GeofenceEvent>,
    pub speed_alert: Option<SpeedViolationAlert>,
}

/// Totals for a batch replay.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub accepted: u64,
    pub rejected: u64,
    pub trips_closed: u64,
    pub crossings: u64,
    pub speed_alerts: u64,
}

/// The stateful per-fleet processing engine.
pub struct Pipeline {
    settings: EngineSettings,
    registry: DeviceRegistry,
    trips: Arc<dyn TripStore>,
    zones: Arc<dyn ZoneProvider>,
    statuses: Arc<dyn StatusStore>,
    events: Arc<dyn EventStore>,
    sink: Arc<dyn EventSink>,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: EngineSettings,
        source: TripSource,
        trips: Arc<dyn TripStore>,
        zones: Arc<dyn ZoneProvider>,
        statuses: Arc<dyn StatusStore>,
        events: Arc<dyn EventStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry: DeviceRegistry::new(settings.clone(), source),
            settings,
            trips,
            zones,
            statuses,
            events,
            sink,
        }
    }

    /// Processes one position report end to end.
    ///
    /// `now` is the plausibility reference clock: wall time for live
    /// streams, the batch cutoff for replays.
    #[instrument(skip(self, report), fields(device_id = %report.device_id))]
    pub async fn process(
        &self,
        report: &PositionReport,
        now: DateTime<Utc>,
    ) -> Result<ProcessOutcome, EngineError> {
        if let Err(reason) = validator::validate(report, now) {
            debug!(reason = %reason, "rejected position report");
            metrics::record_position_rejected(reason.as_str());
            return Ok(ProcessOutcome {
                rejected: Some(reason),
                ..ProcessOutcome::default()
            });
        }
        metrics::record_position_accepted();

        let handle = self.registry.state_for(report.device_id).await;
        let mut state = handle.lock().await;

        let mut outcome = ProcessOutcome::default();

        if let Some(trip) = state.segmenter.consume(report) {
            self.commit_trip(&trip).await?;
            outcome.closed_trip = Some(trip);
        }

        // Zone lookup failures must not cost us the trip, so the geofence
        // stages are skipped for this report and the status row is left as
        // it was.
        let zones = match self.zones.zones_for_device(report.device_id).await {
            Ok(zones) => zones,
            Err(err) => {
                warn!(error = %err, "zone lookup failed, skipping geofence stages");
                metrics::record_zone_lookup_failure();
                return Ok(outcome);
            }
        };

        let prior = self.load_status(&mut state, report.device_id).await?;
        let matched = best_match(
            report.device_id,
            report.latitude,
            report.longitude,
            report.recorded_at,
            &zones,
        );

        let crossing = crate::crossing::step(&prior, matched, report);
        self.commit_status(&crossing.status).await?;

        for event in &crossing.events {
            if self.events.append(event).await? {
                metrics::record_crossing(event.kind.as_str());
                if let Some(zone) = zones.iter().find(|z| z.id == event.geofence_id) {
                    self.publish(DomainEvent::from_crossing(event, zone)).await;
                } else {
                    warn!(
                        geofence_id = %event.geofence_id,
                        "crossing references a zone no longer in scope, not publishing"
                    );
                }
                outcome.crossings.push(event.clone());
            }
        }

        if let Some(zone) = matched {
            if let Some(alert) = state.speed.check(report, zone) {
                metrics::record_speed_alert(alert.severity.as_str());
                self.publish(DomainEvent::from_speed_violation(
                    &alert,
                    zone,
                    report.latitude,
                    report.longitude,
                ))
                .await;
                outcome.speed_alert = Some(alert);
            }
        }

        state.status = Some(crossing.status);
        Ok(outcome)
    }

    /// Replays an ordered batch of historical reports.
    ///
    /// Reports are sorted by timestamp (then device) before processing, so
    /// a batch produces the same records the live stream would have.
    pub async fn replay(
        &self,
        mut reports: Vec<PositionReport>,
        now: DateTime<Utc>,
    ) -> Result<ReplaySummary, EngineError> {
        reports.sort_by_key(|r| (r.recorded_at, r.device_id));

        let mut summary = ReplaySummary::default();
        for report in &reports {
            let outcome = self.process(report, now).await?;
            if outcome.rejected.is_some() {
                summary.rejected += 1;
                continue;
            }
            summary.accepted += 1;
            summary.trips_closed += u64::from(outcome.closed_trip.is_some());
            summary.crossings += outcome.crossings.len() as u64;
            summary.speed_alerts += u64::from(outcome.speed_alert.is_some());
        }

        summary.trips_closed += self.flush().await?.len() as u64;
        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            trips = summary.trips_closed,
            crossings = summary.crossings,
            "replay complete"
        );
        Ok(summary)
    }

    /// Closes and persists every open trip at its last known point.
    pub async fn flush(&self) -> Result<Vec<Trip>, EngineError> {
        let mut closed = Vec::new();
        for (_, handle) in self.registry.all().await {
            let mut state = handle.lock().await;
            if let Some(trip) = state.segmenter.flush() {
                self.commit_trip(&trip).await?;
                closed.push(trip);
            }
        }
        Ok(closed)
    }

    async fn commit_trip(&self, trip: &Trip) -> Result<(), EngineError> {
        self.trips.upsert(trip).await?;
        metrics::record_trip_closed();
        info!(
            device_id = %trip.device_id,
            start_time = %trip.start_time,
            distance_km = trip.distance_km,
            "trip closed"
        );
        Ok(())
    }

    async fn load_status(
        &self,
        state: &mut DeviceState,
        device_id: Uuid,
    ) -> Result<GeofenceStatus, EngineError> {
        if let Some(status) = &state.status {
            return Ok(status.clone());
        }
        let status = self
            .statuses
            .get(device_id)
            .await?
            .unwrap_or_else(|| GeofenceStatus::outside(device_id));
        state.status = Some(status.clone());
        Ok(status)
    }

    /// Writes the status row, retrying a bounded number of times when the
    /// store reports a concurrent-writer conflict.
    async fn commit_status(&self, status: &GeofenceStatus) -> Result<(), EngineError> {
        let attempts = self.settings.status_commit_attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match self.statuses.put(status).await {
                Ok(()) => return Ok(()),
                Err(err @ EngineError::StateConflict { .. }) => {
                    warn!(attempt, error = %err, "status commit conflict, retrying");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err.unwrap_or_else(|| EngineError::StateConflict {
            device_id: status.device_id,
        }))
    }

    /// Publish to the sink; failures are contained here.
    async fn publish(&self, event: DomainEvent) {
        if let Err(err) = self.sink.publish(event).await {
            warn!(error = %err, "event sink publish failed");
            metrics::record_sink_failure();
        }
    }
}
