//! Shared utilities for the fleet telemetry derivation engine.
//!
//! This crate provides common functionality used across all other crates:
//! - The canonical geodesic distance function
//! - Common validation logic for position fields

pub mod geodesy;
pub mod validation;
