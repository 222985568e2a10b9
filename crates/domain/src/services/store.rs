//! Storage abstractions.
//!
//! The engine reads zones and reads/writes trips, statuses, and events
//! through these traits. Production wires Postgres-backed repositories;
//! tests and dry runs wire in-memory stores.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{GeofenceEvent, GeofenceStatus, GeofenceZone, Trip};

/// Durable trip records, upserted on the (device_id, start_time) key.
#[async_trait::async_trait]
pub trait TripStore: Send + Sync {
    /// Insert or overwrite the trip with the same (device_id, start_time).
    async fn upsert(&self, trip: &Trip) -> Result<(), EngineError>;

    /// Trips for one device overlapping the given time range, ordered by
    /// start time.
    async fn find_by_device(
        &self,
        device_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Trip>, EngineError>;
}

/// Read-only geofence zone reference data.
#[async_trait::async_trait]
pub trait ZoneProvider: Send + Sync {
    /// All active-or-not zones in scope for the given device.
    async fn zones_for_device(&self, device_id: Uuid) -> Result<Vec<GeofenceZone>, EngineError>;
}

/// The per-device current-zone row.
#[async_trait::async_trait]
pub trait StatusStore: Send + Sync {
    async fn get(&self, device_id: Uuid) -> Result<Option<GeofenceStatus>, EngineError>;

    async fn put(&self, status: &GeofenceStatus) -> Result<(), EngineError>;
}

/// Append-only geofence event log.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Append an event. Returns `false` when an event with the same
    /// idempotency key already exists (the append is a no-op then).
    async fn append(&self, event: &GeofenceEvent) -> Result<bool, EngineError>;

    /// Events for one device, optionally narrowed to one zone and a time
    /// range, newest first.
    async fn find_by_device(
        &self,
        device_id: Uuid,
        geofence_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<GeofenceEvent>, EngineError>;
}
