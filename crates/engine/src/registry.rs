//! Per-device processing state and mutual exclusion.
//!
//! Each device owns a segmenter, a speed detector, and a cached geofence
//! status. The registry hands out one `Arc<Mutex<DeviceState>>` per device
//! so two reports for the same device can never interleave, while reports
//! for different devices process concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use domain::models::{GeofenceStatus, TripSource};

use crate::config::EngineSettings;
use crate::segmentation::{SegmentationConfig, TripSegmenter};
use crate::speed::SpeedViolationDetector;

/// Mutable processing state for one device.
#[derive(Debug)]
pub struct DeviceState {
    pub segmenter: TripSegmenter,
    pub speed: SpeedViolationDetector,
    /// Geofence status as last committed, loaded lazily from the store.
    pub status: Option<GeofenceStatus>,
}

impl DeviceState {
    fn new(device_id: Uuid, settings: &EngineSettings, source: TripSource) -> Self {
        let config = SegmentationConfig {
            idle_gap: chrono::Duration::seconds(settings.idle_gap_secs),
            min_trip_distance_km: settings.min_trip_distance_km,
        };
        Self {
            segmenter: TripSegmenter::new(device_id, config, source),
            speed: SpeedViolationDetector::new(settings.speed_alert_suppression_secs),
            status: None,
        }
    }
}

/// Concurrent map of device id to processing state.
pub struct DeviceRegistry {
    settings: EngineSettings,
    source: TripSource,
    devices: RwLock<HashMap<Uuid, Arc<Mutex<DeviceState>>>>,
}

impl DeviceRegistry {
    pub fn new(settings: EngineSettings, source: TripSource) -> Self {
        Self {
            settings,
            source,
            devices: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the state handle for a device, creating it on first sight.
    pub async fn state_for(&self, device_id: Uuid) -> Arc<Mutex<DeviceState>> {
        {
            let devices = self.devices.read().await;
            if let Some(state) = devices.get(&device_id) {
                return Arc::clone(state);
            }
        }

        let mut devices = self.devices.write().await;
        Arc::clone(devices.entry(device_id).or_insert_with(|| {
            Arc::new(Mutex::new(DeviceState::new(
                device_id,
                &self.settings,
                self.source,
            )))
        }))
    }

    /// Snapshot of all tracked device handles, for shutdown flushing.
    pub async fn all(&self) -> Vec<(Uuid, Arc<Mutex<DeviceState>>)> {
        self.devices
            .read()
            .await
            .iter()
            .map(|(id, state)| (*id, Arc::clone(state)))
            .collect()
    }
}
