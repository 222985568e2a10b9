//! Position validator.
//!
//! First stage of the pipeline: implausible reports are dropped with a
//! logged reason and never reach trip segmentation or geofence logic.

use chrono::{DateTime, Utc};
use std::fmt;

use domain::models::PositionReport;
use shared::validation;

/// Why a position report was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    LatitudeOutOfRange,
    LongitudeOutOfRange,
    NullIsland,
    SpeedOutOfRange,
    TimestampTooOld,
    TimestampInFuture,
}

impl RejectReason {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::LatitudeOutOfRange => "latitude_out_of_range",
            RejectReason::LongitudeOutOfRange => "longitude_out_of_range",
            RejectReason::NullIsland => "null_island",
            RejectReason::SpeedOutOfRange => "speed_out_of_range",
            RejectReason::TimestampTooOld => "timestamp_too_old",
            RejectReason::TimestampInFuture => "timestamp_in_future",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checks a report against the plausibility rules, relative to `now`.
///
/// Taking the clock as a parameter keeps backfills deterministic: a replay
/// passes the batch cutoff instant instead of the wall clock.
pub fn validate(report: &PositionReport, now: DateTime<Utc>) -> Result<(), RejectReason> {
    if validation::validate_latitude(report.latitude).is_err() {
        return Err(RejectReason::LatitudeOutOfRange);
    }
    if validation::validate_longitude(report.longitude).is_err() {
        return Err(RejectReason::LongitudeOutOfRange);
    }
    // (0, 0) is the classic "no fix" sentinel from cheap trackers.
    if report.latitude == 0.0 && report.longitude == 0.0 {
        return Err(RejectReason::NullIsland);
    }
    if validation::validate_speed_kmh(report.speed_kmh).is_err() {
        return Err(RejectReason::SpeedOutOfRange);
    }
    if report.recorded_at < validation::epoch_floor() {
        return Err(RejectReason::TimestampTooOld);
    }
    let future_limit =
        now + chrono::Duration::seconds(validation::MAX_FUTURE_TOLERANCE_SECS);
    if report.recorded_at > future_limit {
        return Err(RejectReason::TimestampInFuture);
    }
    Ok(())
}
