//! Geofence zone reference data.
//!
//! Zones are admin-managed and read-only from the engine's perspective. The
//! engine only ever asks two questions of a zone: does it apply to this
//! report (scope, active flag, time window), and does it contain this point.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use geo::{point, Contains, LineString, Polygon};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vertex of a polygon boundary ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    pub latitude: f64,
    pub longitude: f64,
}

/// Zone geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ZoneShape {
    Circle {
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    },
    Polygon {
        /// Boundary ring; closing vertex may be omitted.
        ring: Vec<Vertex>,
    },
    Rectangle {
        min_latitude: f64,
        min_longitude: f64,
        max_latitude: f64,
        max_longitude: f64,
    },
}

impl ZoneShape {
    /// Returns the string representation for storage and event payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ZoneShape::Circle { .. } => "circle",
            ZoneShape::Polygon { .. } => "polygon",
            ZoneShape::Rectangle { .. } => "rectangle",
        }
    }

    /// Geometric containment test for a WGS84 point.
    ///
    /// Circles use the canonical geodesic distance so the result can never
    /// disagree with trip-distance accumulation over the same coordinates.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        match self {
            ZoneShape::Circle {
                latitude: center_lat,
                longitude: center_lon,
                radius_meters,
            } => {
                shared::geodesy::distance_meters(latitude, longitude, *center_lat, *center_lon)
                    <= *radius_meters
            }
            ZoneShape::Polygon { ring } => {
                if ring.len() < 3 {
                    return false;
                }
                let exterior: LineString<f64> = ring
                    .iter()
                    .map(|v| (v.longitude, v.latitude))
                    .collect::<Vec<_>>()
                    .into();
                let polygon = Polygon::new(exterior, vec![]);
                polygon.contains(&point!(x: longitude, y: latitude))
            }
            ZoneShape::Rectangle {
                min_latitude,
                min_longitude,
                max_latitude,
                max_longitude,
            } => {
                (*min_latitude..=*max_latitude).contains(&latitude)
                    && (*min_longitude..=*max_longitude).contains(&longitude)
            }
        }
    }
}

/// Days-of-week plus time-of-day window during which a zone is armed.
///
/// Window times are interpreted in UTC. A window whose end precedes its
/// start wraps past midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWindow {
    pub weekdays: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ActiveWindow {
    /// Whether the given instant falls inside this window.
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        if !self.weekdays.contains(&at.weekday()) {
            return false;
        }
        let time = at.time();
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            // Overnight window, e.g. 22:00-06:00.
            time >= self.start || time <= self.end
        }
    }
}

/// A geofence zone as configured by fleet administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceZone {
    pub id: Uuid,
    pub name: String,
    pub shape: ZoneShape,
    /// Higher wins when several zones contain the same point.
    pub priority: i32,
    pub active: bool,
    /// `None` scopes the zone to every device in the fleet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_window: Option<ActiveWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_kmh: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl GeofenceZone {
    /// Whether this zone is in scope for the given device.
    pub fn applies_to(&self, device_id: Uuid) -> bool {
        match self.device_id {
            Some(scoped) => scoped == device_id,
            None => true,
        }
    }

    /// Whether this zone is armed at the given instant.
    pub fn armed_at(&self, at: &DateTime<Utc>) -> bool {
        match &self.active_window {
            Some(window) => window.contains(at),
            None => true,
        }
    }
}
