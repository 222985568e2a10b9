//! Domain services: pure logic and downstream abstractions.

pub mod matcher;
pub mod sink;
pub mod store;

pub use matcher::best_match;
pub use sink::{EventSink, LogEventSink, MockEventSink};
pub use store::{EventStore, StatusStore, TripStore, ZoneProvider};
