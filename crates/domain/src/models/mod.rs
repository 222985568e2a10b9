//! Domain models for the derivation engine.

pub mod domain_event;
pub mod position;
pub mod speed_alert;
pub mod trip;
pub mod zone;
pub mod zone_event;
pub mod zone_status;

pub use domain_event::{DomainEvent, DomainEventType, EventSeverity};
pub use position::{IgnitionState, PositionReport};
pub use speed_alert::SpeedViolationAlert;
pub use trip::{Trip, TripSource};
pub use zone::{ActiveWindow, GeofenceZone, ZoneShape};
pub use zone_event::{CrossingKind, GeofenceEvent};
pub use zone_status::GeofenceStatus;
