//! In-memory store implementations.
//!
//! Used by the engine's test suites and by dry-run backfills. Behavior
//! matches the Postgres repositories: trip upserts replace on the
//! (device_id, start_time) key and event appends dedupe on event_key.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use domain::models::{GeofenceEvent, GeofenceStatus, GeofenceZone, Trip};
use domain::services::{EventStore, StatusStore, TripStore, ZoneProvider};
use domain::EngineError;

/// In-memory trip store keyed by (device_id, start_time).
#[derive(Debug, Default)]
pub struct InMemoryTripStore {
    trips: Mutex<BTreeMap<(Uuid, DateTime<Utc>), Trip>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored trip, ordered by key.
    pub fn all(&self) -> Vec<Trip> {
        self.trips.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.trips.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl TripStore for InMemoryTripStore {
    async fn upsert(&self, trip: &Trip) -> Result<(), EngineError> {
        self.trips.lock().unwrap().insert(trip.key(), trip.clone());
        Ok(())
    }

    async fn find_by_device(
        &self,
        device_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Trip>, EngineError> {
        Ok(self
            .trips
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.device_id == device_id && t.start_time < to && t.end_time > from)
            .cloned()
            .collect())
    }
}

/// Fixed zone set served to every lookup.
#[derive(Debug, Default)]
pub struct InMemoryZoneProvider {
    zones: Vec<GeofenceZone>,
}

impl InMemoryZoneProvider {
    pub fn new(zones: Vec<GeofenceZone>) -> Self {
        Self { zones }
    }
}

#[async_trait::async_trait]
impl ZoneProvider for InMemoryZoneProvider {
    async fn zones_for_device(&self, device_id: Uuid) -> Result<Vec<GeofenceZone>, EngineError> {
        Ok(self
            .zones
            .iter()
            .filter(|z| z.active && z.applies_to(device_id))
            .cloned()
            .collect())
    }
}

/// In-memory per-device status rows.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    statuses: Mutex<HashMap<Uuid, GeofenceStatus>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a persisted status, as if left over from a previous run.
    pub fn seed(&self, status: GeofenceStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(status.device_id, status);
    }
}

#[async_trait::async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn get(&self, device_id: Uuid) -> Result<Option<GeofenceStatus>, EngineError> {
        Ok(self.statuses.lock().unwrap().get(&device_id).cloned())
    }

    async fn put(&self, status: &GeofenceStatus) -> Result<(), EngineError> {
        self.statuses
            .lock()
            .unwrap()
            .insert(status.device_id, status.clone());
        Ok(())
    }
}

/// In-memory append-only event log with event_key dedupe.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<GeofenceEvent>>,
    seen_keys: Mutex<HashSet<Uuid>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored event in append order.
    pub fn all(&self) -> Vec<GeofenceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: &GeofenceEvent) -> Result<bool, EngineError> {
        if !self.seen_keys.lock().unwrap().insert(event.event_key) {
            return Ok(false);
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(true)
    }

    async fn find_by_device(
        &self,
        device_id: Uuid,
        geofence_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<GeofenceEvent>, EngineError> {
        let mut events: Vec<GeofenceEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.device_id == device_id)
            .filter(|e| geofence_id.map_or(true, |z| e.geofence_id == z))
            .filter(|e| e.occurred_at >= from && e.occurred_at <= to)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::models::zone_event::CrossingKind;
    use domain::models::TripSource;

    fn trip(device_id: Uuid, start: DateTime<Utc>, distance_km: f64) -> Trip {
        Trip {
            device_id,
            start_time: start,
            end_time: start + chrono::Duration::minutes(10),
            distance_km,
            duration_seconds: 600,
            avg_speed_kmh: distance_km * 6.0,
            max_speed_kmh: 50.0,
            start_latitude: 48.0,
            start_longitude: 17.0,
            end_latitude: 48.1,
            end_longitude: 17.1,
            source: TripSource::Stream,
        }
    }

    #[tokio::test]
    async fn test_trip_upsert_replaces_same_key() {
        let store = InMemoryTripStore::new();
        let device = Uuid::new_v4();
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

        store.upsert(&trip(device, start, 1.0)).await.unwrap();
        store.upsert(&trip(device, start, 2.5)).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].distance_km, 2.5);
    }

    #[tokio::test]
    async fn test_trip_range_query() {
        let store = InMemoryTripStore::new();
        let device = Uuid::new_v4();
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        store.upsert(&trip(device, start, 1.0)).await.unwrap();

        let hits = store
            .find_by_device(device, start - chrono::Duration::hours(1), start + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let misses = store
            .find_by_device(device, start + chrono::Duration::hours(2), start + chrono::Duration::hours(3))
            .await
            .unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn test_event_append_dedupes_on_key() {
        let store = InMemoryEventStore::new();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let device = Uuid::new_v4();
        let zone = Uuid::new_v4();
        let event = GeofenceEvent {
            event_key: GeofenceEvent::idempotency_key(device, CrossingKind::Entry, zone, at),
            device_id: device,
            geofence_id: zone,
            kind: CrossingKind::Entry,
            occurred_at: at,
            latitude: 48.0,
            longitude: 17.0,
            speed_kmh: 20.0,
            duration_inside_seconds: None,
        };

        assert!(store.append(&event).await.unwrap());
        assert!(!store.append(&event).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_status_store_round_trip() {
        let store = InMemoryStatusStore::new();
        let device = Uuid::new_v4();
        assert!(store.get(device).await.unwrap().is_none());

        let status = GeofenceStatus::inside(device, Uuid::new_v4(), Utc::now());
        store.put(&status).await.unwrap();
        assert_eq!(store.get(device).await.unwrap(), Some(status));
    }
}
