//! The fleet telemetry derivation engine.
//!
//! Consumes a per-device-ordered stream of position reports and derives
//! trips plus geofence entry/exit and speed-violation events. The stages
//! are composed by [`pipeline::Pipeline`]:
//!
//! Validate -> Segment -> MatchZone -> DetectCrossing -> DetectSpeedViolation -> Publish
//!
//! Each stage is a pure function or an explicit state transition; all
//! per-device mutable state lives behind a per-device lock owned by
//! [`registry::DeviceRegistry`].

pub mod config;
pub mod crossing;
pub mod metrics;
pub mod pipeline;
pub mod registry;
pub mod segmentation;
pub mod speed;
pub mod telemetry;
pub mod validator;
