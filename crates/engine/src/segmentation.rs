//! Trip segmentation engine.
//!
//! Consumes the per-device ordered position stream and maintains the open
//! trip accumulator. A trip starts with an ignition-on point, is extended
//! by further ignition-on points, and closes when ignition goes off (or
//! unknown) or when the gap between ignition-on points exceeds the idle
//! threshold.
//!
//! The ignition-off (or unknown) report that closes a trip still advances
//! the trip's end to its own time and position: the vehicle was driving
//! until the engine stopped. It does not contribute to speed statistics.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use domain::models::{IgnitionState, PositionReport, Trip, TripSource};

/// Segmentation tunables.
#[derive(Debug, Clone, Copy)]
pub struct SegmentationConfig {
    /// Splitting gap between ignition-on points. Strictly greater-than:
    /// a gap of exactly this duration extends the open trip.
    pub idle_gap: Duration,
    /// Closed trips shorter than this are discarded as GPS jitter.
    pub min_trip_distance_km: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            idle_gap: Duration::seconds(180),
            min_trip_distance_km: 0.05,
        }
    }
}

/// The hidden per-device accumulator for the open trip.
#[derive(Debug, Clone)]
struct OpenTrip {
    start_time: DateTime<Utc>,
    last_time: DateTime<Utc>,
    start_latitude: f64,
    start_longitude: f64,
    last_latitude: f64,
    last_longitude: f64,
    distance_km: f64,
    max_speed_kmh: f64,
    speed_sum: f64,
    sample_count: u32,
}

impl OpenTrip {
    fn start(report: &PositionReport) -> Self {
        Self {
            start_time: report.recorded_at,
            last_time: report.recorded_at,
            start_latitude: report.latitude,
            start_longitude: report.longitude,
            last_latitude: report.latitude,
            last_longitude: report.longitude,
            distance_km: 0.0,
            max_speed_kmh: report.speed_kmh,
            speed_sum: report.speed_kmh,
            sample_count: 1,
        }
    }

    /// Advance position and time to the given report.
    fn advance(&mut self, report: &PositionReport) {
        self.distance_km += shared::geodesy::distance_km(
            self.last_latitude,
            self.last_longitude,
            report.latitude,
            report.longitude,
        );
        self.last_time = report.recorded_at;
        self.last_latitude = report.latitude;
        self.last_longitude = report.longitude;
    }

    /// Extend with another ignition-on point.
    fn extend(&mut self, report: &PositionReport) {
        self.advance(report);
        self.max_speed_kmh = self.max_speed_kmh.max(report.speed_kmh);
        self.speed_sum += report.speed_kmh;
        self.sample_count += 1;
    }

    /// Close the accumulator into a trip, or discard it as jitter.
    fn finalize(
        self,
        device_id: uuid::Uuid,
        config: &SegmentationConfig,
        source: TripSource,
    ) -> Option<Trip> {
        if self.last_time <= self.start_time {
            // Single-point trip; nothing to emit.
            return None;
        }
        if self.distance_km < config.min_trip_distance_km {
            debug!(
                distance_km = self.distance_km,
                "discarding sub-minimum trip as idle jitter"
            );
            return None;
        }

        let duration_seconds = (self.last_time - self.start_time).num_seconds();
        Some(Trip {
            device_id,
            start_time: self.start_time,
            end_time: self.last_time,
            distance_km: self.distance_km,
            duration_seconds,
            avg_speed_kmh: self.speed_sum / self.sample_count as f64,
            max_speed_kmh: self.max_speed_kmh,
            start_latitude: self.start_latitude,
            start_longitude: self.start_longitude,
            end_latitude: self.last_latitude,
            end_longitude: self.last_longitude,
            source,
        })
    }
}

/// Per-device trip segmenter.
///
/// Contract: `consume(report) -> Option<Trip>`. Reports must arrive in
/// timestamp order for one device; the caller guarantees this via the
/// per-device critical section.
#[derive(Debug)]
pub struct TripSegmenter {
    device_id: uuid::Uuid,
    config: SegmentationConfig,
    source: TripSource,
    open: Option<OpenTrip>,
}

impl TripSegmenter {
    pub fn new(device_id: uuid::Uuid, config: SegmentationConfig, source: TripSource) -> Self {
        Self {
            device_id,
            config,
            source,
            open: None,
        }
    }

    /// Feed the next validated report. Returns a finalized trip when this
    /// report closes one.
    pub fn consume(&mut self, report: &PositionReport) -> Option<Trip> {
        match report.ignition {
            IgnitionState::On => {
                let split = match &self.open {
                    None => true,
                    Some(open) => report.recorded_at - open.last_time > self.config.idle_gap,
                };

                if split {
                    // A long ignition-on gap is treated conservatively as
                    // two separate trips.
                    let closed = self.close();
                    self.open = Some(OpenTrip::start(report));
                    closed
                } else {
                    // Unwrap is safe: split is false only when a trip is open.
                    self.open.as_mut().unwrap().extend(report);
                    None
                }
            }
            IgnitionState::Off | IgnitionState::Unknown => match self.open.take() {
                Some(mut open) => {
                    open.advance(report);
                    self.seal(open)
                }
                None => None,
            },
        }
    }

    /// Close any open accumulator at its last known point. Used at the end
    /// of a backfill and when a split occurs.
    pub fn flush(&mut self) -> Option<Trip> {
        self.close()
    }

    /// Running distance of the open trip, if any.
    pub fn open_distance_km(&self) -> Option<f64> {
        self.open.as_ref().map(|open| open.distance_km)
    }

    fn close(&mut self) -> Option<Trip> {
        let open = self.open.take()?;
        self.seal(open)
    }

    fn seal(&mut self, open: OpenTrip) -> Option<Trip> {
        open.finalize(self.device_id, &self.config, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn report(
        device_id: Uuid,
        at: DateTime<Utc>,
        lat: f64,
        lon: f64,
        speed: f64,
        ignition: IgnitionState,
    ) -> PositionReport {
        PositionReport {
            device_id,
            recorded_at: at,
            latitude: lat,
            longitude: lon,
            speed_kmh: speed,
            ignition,
            battery_level: None,
            heading: None,
        }
    }

    fn segmenter(device_id: Uuid) -> TripSegmenter {
        TripSegmenter::new(device_id, SegmentationConfig::default(), TripSource::Stream)
    }

    #[test]
    fn test_first_point_starts_trip_with_zero_distance() {
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);
        assert!(seg
            .consume(&report(device, t0(), 48.0, 17.0, 10.0, IgnitionState::On))
            .is_none());
        assert_eq!(seg.open_distance_km(), Some(0.0));
    }

    #[test]
    fn test_off_without_open_trip_is_noop() {
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);
        assert!(seg
            .consume(&report(device, t0(), 48.0, 17.0, 0.0, IgnitionState::Off))
            .is_none());
    }

    #[test]
    fn test_end_to_end_scenario() {
        // t0: ignition on, speed 0 at P1.
        // t0+60s: speed 40 at P2, ~300 m from P1.
        // t0+65min: ignition off at P2.
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);

        let p1 = (48.1486, 17.1077);
        let p2 = (48.1513, 17.1077); // ~300 m north

        assert!(seg
            .consume(&report(device, t0(), p1.0, p1.1, 0.0, IgnitionState::On))
            .is_none());
        assert!(seg
            .consume(&report(
                device,
                t0() + Duration::seconds(60),
                p2.0,
                p2.1,
                40.0,
                IgnitionState::On
            ))
            .is_none());

        let trip = seg
            .consume(&report(
                device,
                t0() + Duration::minutes(65),
                p2.0,
                p2.1,
                0.0,
                IgnitionState::Off,
            ))
            .expect("ignition off closes the trip");

        assert_eq!(trip.device_id, device);
        assert_eq!(trip.start_time, t0());
        assert_eq!(trip.end_time, t0() + Duration::minutes(65));
        assert_eq!(trip.duration_seconds, 3900);
        assert!((trip.distance_km - 0.3).abs() < 0.02, "got {}", trip.distance_km);
        assert_eq!(trip.max_speed_kmh, 40.0);
        assert!(trip.is_well_formed());
    }

    #[test]
    fn test_gap_boundary_exact_threshold_extends() {
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);

        seg.consume(&report(device, t0(), 48.0, 17.0, 30.0, IgnitionState::On));
        // Exactly 180.000s: same trip.
        assert!(seg
            .consume(&report(
                device,
                t0() + Duration::seconds(180),
                48.01,
                17.0,
                30.0,
                IgnitionState::On
            ))
            .is_none());
        assert!(seg.open_distance_km().unwrap() > 1.0);
    }

    #[test]
    fn test_gap_boundary_just_over_threshold_splits() {
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);

        seg.consume(&report(device, t0(), 48.0, 17.0, 30.0, IgnitionState::On));
        seg.consume(&report(
            device,
            t0() + Duration::seconds(60),
            48.01,
            17.0,
            30.0,
            IgnitionState::On,
        ));

        // 180.001s after the previous point: the old trip closes at its
        // last point and a new one opens here.
        let closed = seg.consume(&report(
            device,
            t0() + Duration::seconds(60) + Duration::milliseconds(180_001),
            48.02,
            17.0,
            30.0,
            IgnitionState::On,
        ));

        let trip = closed.expect("gap split closes the first trip");
        assert_eq!(trip.end_time, t0() + Duration::seconds(60));
        assert_eq!(seg.open_distance_km(), Some(0.0));
    }

    #[test]
    fn test_minimum_movement_filter() {
        let device = Uuid::new_v4();

        // ~44 m of movement: discarded.
        let mut seg = segmenter(device);
        seg.consume(&report(device, t0(), 48.0, 17.0, 5.0, IgnitionState::On));
        seg.consume(&report(
            device,
            t0() + Duration::seconds(30),
            48.0004,
            17.0,
            5.0,
            IgnitionState::On,
        ));
        assert!(seg
            .consume(&report(
                device,
                t0() + Duration::seconds(60),
                48.0004,
                17.0,
                0.0,
                IgnitionState::Off
            ))
            .is_none());

        // ~55 m of movement: kept.
        let mut seg = segmenter(device);
        seg.consume(&report(device, t0(), 48.0, 17.0, 5.0, IgnitionState::On));
        seg.consume(&report(
            device,
            t0() + Duration::seconds(30),
            48.0005,
            17.0,
            5.0,
            IgnitionState::On,
        ));
        let trip = seg.consume(&report(
            device,
            t0() + Duration::seconds(60),
            48.0005,
            17.0,
            0.0,
            IgnitionState::Off,
        ));
        assert!(trip.is_some());
        assert!(trip.unwrap().distance_km >= 0.05);
    }

    #[test]
    fn test_unknown_ignition_closes_like_off() {
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);
        seg.consume(&report(device, t0(), 48.0, 17.0, 30.0, IgnitionState::On));
        seg.consume(&report(
            device,
            t0() + Duration::seconds(120),
            48.01,
            17.0,
            30.0,
            IgnitionState::On,
        ));
        let trip = seg.consume(&report(
            device,
            t0() + Duration::seconds(150),
            48.01,
            17.0,
            0.0,
            IgnitionState::Unknown,
        ));
        assert!(trip.is_some());
        assert_eq!(trip.unwrap().end_time, t0() + Duration::seconds(150));
    }

    #[test]
    fn test_running_distance_is_monotonic() {
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);
        seg.consume(&report(device, t0(), 48.0, 17.0, 30.0, IgnitionState::On));

        let mut previous = seg.open_distance_km().unwrap();
        for i in 1..20 {
            // Wander back and forth; distance must still never decrease.
            let lat = 48.0 + (i as f64 % 3.0) * 0.001;
            seg.consume(&report(
                device,
                t0() + Duration::seconds(i * 30),
                lat,
                17.0,
                30.0,
                IgnitionState::On,
            ));
            let current = seg.open_distance_km().unwrap();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_flush_closes_open_trip() {
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);
        seg.consume(&report(device, t0(), 48.0, 17.0, 30.0, IgnitionState::On));
        seg.consume(&report(
            device,
            t0() + Duration::seconds(120),
            48.02,
            17.0,
            30.0,
            IgnitionState::On,
        ));

        let trip = seg.flush().expect("flush closes the open trip");
        assert_eq!(trip.end_time, t0() + Duration::seconds(120));
        assert!(seg.flush().is_none());
    }

    #[test]
    fn test_avg_speed_over_ignition_on_samples() {
        let device = Uuid::new_v4();
        let mut seg = segmenter(device);
        seg.consume(&report(device, t0(), 48.0, 17.0, 20.0, IgnitionState::On));
        seg.consume(&report(
            device,
            t0() + Duration::seconds(60),
            48.01,
            17.0,
            40.0,
            IgnitionState::On,
        ));
        let trip = seg
            .consume(&report(
                device,
                t0() + Duration::seconds(120),
                48.01,
                17.0,
                0.0,
                IgnitionState::Off,
            ))
            .unwrap();
        assert!((trip.avg_speed_kmh - 30.0).abs() < 1e-9);
    }
}
