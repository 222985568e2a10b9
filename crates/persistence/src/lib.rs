//! Persistence layer for the fleet telemetry derivation engine.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Postgres-backed repository implementations of the domain store traits
//! - In-memory store implementations for tests and dry runs

pub mod db;
pub mod entities;
pub mod memory;
pub mod repositories;
