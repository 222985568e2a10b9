//! Postgres-backed repositories implementing the domain store traits.

pub mod trip;
pub mod zone;
pub mod zone_event;
pub mod zone_status;

pub use trip::TripRepository;
pub use zone::ZoneRepository;
pub use zone_event::GeofenceEventRepository;
pub use zone_status::GeofenceStatusRepository;
