//! Domain layer for the fleet telemetry derivation engine.
//!
//! This crate contains:
//! - Domain models (PositionReport, Trip, GeofenceZone, GeofenceEvent)
//! - Pure business logic (zone matching, severity classification)
//! - Storage and event-sink abstractions
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::EngineError;
