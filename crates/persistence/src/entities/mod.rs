//! Database row mappings.

pub mod trip;
pub mod zone;
pub mod zone_event;
pub mod zone_status;

pub use trip::TripEntity;
pub use zone::ZoneEntity;
pub use zone_event::GeofenceEventEntity;
pub use zone_status::GeofenceStatusEntity;
