use crate::accessory::{AccessoryState, BatteryStatus, DeviceKind};
use crate::config::BridgeConfig;
use crate::device::DeviceId;
use crate::dictionary::field;
use crate::error::SyncError;
use crate::patch::{apply_patch, PatchOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Notification broadcast after a record ingested a snapshot or patch
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceUpdate {
    pub device_id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    /// Normalized state rendered from the record's current data
    pub state: AccessoryState,
    pub battery: Option<BatteryStatus>,
    /// Motion sensors with an occupancy window configured
    pub occupied: Option<bool>,
    /// False when the last patch was only partially applied
    pub complete: bool,
    pub timestamp: DateTime<Utc>,
}

/// In-memory mirror of one remote device
///
/// `data` is mutated only through `handle_snapshot` and `handle_patch`;
/// both end with exactly one notification.
pub struct Device {
    id: DeviceId,
    name: String,
    kind: DeviceKind,
    data: Value,
    last_patch_complete: bool,
    last_motion: Option<DateTime<Utc>>,
    config: Arc<BridgeConfig>,
    update_tx: broadcast::Sender<DeviceUpdate>,
}

impl Device {
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        kind: DeviceKind,
        data: Option<Value>,
        config: Arc<BridgeConfig>,
        update_tx: broadcast::Sender<DeviceUpdate>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            data: data.unwrap_or_else(|| Value::Object(Map::new())),
            last_patch_complete: true,
            last_motion: None,
            config,
            update_tx,
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Last known data, as merged from snapshots and patches
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Normalized state of the current data
    pub fn state(&self) -> AccessoryState {
        AccessoryState::render(self.kind, &self.data, &self.config)
    }

    pub fn battery(&self) -> Option<BatteryStatus> {
        BatteryStatus::render(self.kind, &self.data, &self.config)
    }

    /// Whether a motion sensor still counts as occupied at `now`
    ///
    /// Occupied while the last detected motion is within the configured
    /// window. `None` for other kinds or when the window is disabled.
    pub fn occupied(&self, now: DateTime<Utc>) -> Option<bool> {
        if self.kind != DeviceKind::MotionSensor {
            return None;
        }
        let window = chrono::Duration::from_std(self.config.motion_occupancy_window()?).ok()?;
        Some(self.last_motion.map_or(false, |at| now - at < window))
    }

    /// Replace the data wholesale with a full record for this device
    pub fn handle_snapshot(&mut self, data: Value) -> Result<(), SyncError> {
        self.check_identity("snapshot", data.get(field::ID))?;

        self.data = data;
        self.last_patch_complete = true;
        self.notify();
        Ok(())
    }

    /// Overlay a partial update onto the data
    ///
    /// Notifies even when some sub-paths could not be applied; the update
    /// carries `complete = false` in that case.
    pub fn handle_patch(&mut self, patch: &Map<String, Value>) -> Result<PatchOutcome, SyncError> {
        self.check_identity("patch", patch.get(field::ID))?;

        let outcome = apply_patch(&mut self.data, patch);
        if !outcome.is_complete() {
            warn!(
                device_id = %self.id,
                failed = ?outcome.failed_paths(),
                "Patch partially applied"
            );
        }
        self.last_patch_complete = outcome.is_complete();
        self.notify();
        Ok(outcome)
    }

    /// Signal consumers that the data changed
    pub fn notify(&mut self) {
        let now = Utc::now();
        if matches!(self.state(), AccessoryState::Motion { detected: true, .. }) {
            self.last_motion = Some(now);
        }

        let update = DeviceUpdate {
            device_id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            state: self.state(),
            battery: self.battery(),
            occupied: self.occupied(now),
            complete: self.last_patch_complete,
            timestamp: now,
        };
        trace!(device_id = %self.id, state = ?update.state, "Device notify");

        // No subscribers is fine
        let _ = self.update_tx.send(update);
    }

    fn check_identity(&self, kind: &'static str, id: Option<&Value>) -> Result<(), SyncError> {
        match id.and_then(DeviceId::from_value) {
            Some(found) if found == self.id => Ok(()),
            found => Err(SyncError::IdentityMismatch {
                kind,
                expected: self.id.clone(),
                found: found.map_or_else(|| "<none>".to_string(), |id| id.to_string()),
            }),
        }
    }
}
