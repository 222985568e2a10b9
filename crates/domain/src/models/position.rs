//! Position report domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Ignition state reported by the vehicle tracker.
///
/// Older tracker firmware omits the ignition flag entirely, so `Unknown`
/// is a first-class state rather than a decoding failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnitionState {
    On,
    Off,
    #[default]
    Unknown,
}

impl IgnitionState {
    /// Returns the string representation for logging and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnitionState::On => "on",
            IgnitionState::Off => "off",
            IgnitionState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IgnitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IgnitionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(IgnitionState::On),
            "off" => Ok(IgnitionState::Off),
            "unknown" => Ok(IgnitionState::Unknown),
            _ => Err(format!(
                "Invalid ignition state: {}. Must be one of: on, off, unknown",
                s
            )),
        }
    }
}

/// A single GPS position report for one device, as delivered by the feed
/// adapter. Immutable input; ordered per device by `recorded_at` and
/// delivered at-least-once.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PositionReport {
    pub device_id: Uuid,

    pub recorded_at: DateTime<Utc>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    /// Instantaneous speed in km/h as reported by the tracker.
    #[validate(custom(function = "shared::validation::validate_speed_kmh"))]
    pub speed_kmh: f64,

    #[serde(default)]
    pub ignition: IgnitionState,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_battery_level"))]
    pub battery_level: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_heading"))]
    pub heading: Option<f64>,
}
