// Device registry: binds accessories to records and routes snapshots and
// real-time messages onto them

use crate::accessory::{AccessoryContext, DeviceKind};
use crate::config::BridgeConfig;
use crate::device::{Device, DeviceId, DeviceUpdate};
use crate::dictionary::{
    field, INBOX_MESSAGE_TYPE, JAM_ALERT_PREFIX, JAM_ALERT_SUFFIX, LOCK_JAMMED_STATUS,
};
use crate::error::SyncError;
use crate::message::{parse_timestamp, Message, MessageData, SystemSnapshot};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};


/// What `handle_message` did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Message carried nothing applicable to device records
    NoData,
    /// Origin timestamp is older than the last snapshot; nothing was touched
    Stale,
    /// Patches were routed; `devices` records were patched
    Applied { devices: usize },
}

/// Collection of device records mirroring the remote system
///
/// All mutation goes through `&mut self`, so one snapshot or one message is
/// applied completely before the next is looked at.
pub struct DeviceSet {
    config: Arc<BridgeConfig>,

    /// Id the vendor uses as the envelope `Id` of system-status messages
    system_panel_id: Option<DeviceId>,

    /// Device id of the bound panel record
    panel_device_id: Option<DeviceId>,

    /// Bind order
    order: Vec<DeviceId>,

    devices_by_id: HashMap<DeviceId, Device>,

    /// Freshness horizon; unset until the first snapshot
    last_snapshot_time: Option<DateTime<Utc>>,

    update_tx: broadcast::Sender<DeviceUpdate>,
}

impl DeviceSet {
    pub fn new(config: Arc<BridgeConfig>, system_panel_id: Option<DeviceId>) -> Self {
        let (update_tx, _) = broadcast::channel(config.channel_capacity.max(1));

        Self {
            config,
            system_panel_id,
            panel_device_id: None,
            order: Vec::new(),
            devices_by_id: HashMap::new(),
            last_snapshot_time: None,
            update_tx,
        }
    }

    /// Subscribe to device updates
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceUpdate> {
        self.update_tx.subscribe()
    }

    pub fn config(&self) -> &Arc<BridgeConfig> {
        &self.config
    }

    /// Create and register the record for an already-created accessory.
    ///
    /// Binding the same id again replaces the record in place. Binding does
    /// not notify; the first snapshot does.
    pub fn bind_accessory(
        &mut self,
        context: &AccessoryContext,
        data: Option<Value>,
    ) -> Result<&Device, SyncError> {
        let kind = DeviceKind::from_class_name(&context.device_class_name)
            .ok_or_else(|| SyncError::UnknownDeviceClass(context.device_class_name.clone()))?;
        let id = context.id.clone();

        if kind == DeviceKind::Panel {
            self.panel_device_id = Some(id.clone());
        } else if self.panel_device_id.as_ref() == Some(&id) {
            // Panel id rebound as another class; stop redirecting arm state
            self.panel_device_id = None;
        }
        if !self.devices_by_id.contains_key(&id) {
            self.order.push(id.clone());
        }

        debug!(device_id = %id, class = kind.class_name(), name = %context.name, "Binding accessory");

        let device = Device::new(
            id.clone(),
            context.name.clone(),
            kind,
            data,
            self.config.clone(),
            self.update_tx.clone(),
        );

        Ok(match self.devices_by_id.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(device);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(device),
        })
    }

    /// Apply a full system snapshot taken at `timestamp`.
    ///
    /// The snapshot always wins: the freshness horizon moves to `timestamp`
    /// unconditionally. Bound records without an entry are left untouched.
    /// Returns the number of records updated.
    pub fn handle_snapshot(
        &mut self,
        mut snapshot: SystemSnapshot,
        timestamp: DateTime<Utc>,
    ) -> Result<usize, SyncError> {
        self.last_snapshot_time = Some(timestamp);
        debug!(timestamp = %timestamp, devices = snapshot.devices.len(), "Handling device snapshot");

        // System arm state lives outside the panel's own entry
        if let (Some(panel_id), Some(status)) = (&self.panel_device_id, snapshot.status.clone()) {
            if let Some(Value::Object(entry)) = snapshot.device_mut(panel_id) {
                entry.insert(field::STATUS.to_string(), status);
            }
        }

        let mut entries: HashMap<DeviceId, Value> = HashMap::new();
        for entry in snapshot.devices {
            if let Some(id) = DeviceId::of(&entry) {
                entries.entry(id).or_insert(entry);
            }
        }

        let mut updated = 0;
        for id in &self.order {
            if let (Some(data), Some(device)) = (entries.remove(id), self.devices_by_id.get_mut(id)) {
                device.handle_snapshot(data)?;
                updated += 1;
            }
        }

        if !entries.is_empty() {
            debug!(unbound = entries.len(), "Snapshot entries without a bound device");
        }

        Ok(updated)
    }

    /// Route one real-time message onto the bound records.
    pub fn handle_message(&mut self, message: Message) -> Result<MessageOutcome, SyncError> {
        let Message { id, kind, data } = message;
        let mut data = match data {
            Some(data) => data,
            None => return Ok(MessageOutcome::NoData),
        };

        if self.is_stale(&data) {
            return Ok(MessageOutcome::Stale);
        }

        let is_system_status = id.is_some() && id == self.system_panel_id;
        if is_system_status && data.status.is_some() {
            data.devices = Some(self.redirect_panel_status(data.status.take()));
        } else if kind.as_deref() == Some(INBOX_MESSAGE_TYPE) {
            if let Some(patch) = data.subject.as_deref().and_then(|s| self.jam_alert_patch(s)) {
                data.devices = Some(vec![patch]);
            }
        }

        let patches = match data.devices {
            Some(patches) => patches,
            None => return Ok(MessageOutcome::NoData),
        };

        let mut applied = 0;
        for patch in &patches {
            let fields = match patch.as_object() {
                Some(fields) => fields,
                None => {
                    debug!(patch = %patch, "Skipping non-object patch");
                    continue;
                }
            };
            let device = match DeviceId::of(patch).and_then(|id| self.devices_by_id.get_mut(&id)) {
                Some(device) => device,
                None => {
                    debug!(device_id = ?patch.get(field::ID), "Patch for unbound device ignored");
                    continue;
                }
            };
            device.handle_patch(fields)?;
            applied += 1;
        }

        Ok(MessageOutcome::Applied { devices: applied })
    }

    fn is_stale(&self, data: &MessageData) -> bool {
        let horizon = match self.last_snapshot_time {
            Some(horizon) => horizon,
            None => return false,
        };
        let raw = match data.origin_timestamp() {
            Some(raw) => raw,
            None => {
                warn!("Message without origin timestamp, treating as fresh");
                return false;
            }
        };

        match parse_timestamp(raw) {
            Ok(origin) if origin < horizon => {
                warn!(message_ts = %origin, snapshot_ts = %horizon, "Ignoring stale update");
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "Unreadable message timestamp, treating as fresh");
                false
            }
        }
    }

    /// Panel arm state arrives at system level; readdress it to the panel record
    fn redirect_panel_status(&self, status: Option<Value>) -> Vec<Value> {
        match (&self.panel_device_id, status) {
            (Some(panel_id), Some(status)) => vec![status_patch(panel_id, status)],
            _ => {
                debug!("System status received but no panel is bound");
                Vec::new()
            }
        }
    }

    fn jam_alert_patch(&self, subject: &str) -> Option<Value> {
        let name = lock_name_from_subject(subject)?;
        match self.lock_named(name) {
            Some(lock) => {
                info!(device_id = %lock.id(), name = %name, "Lock reported jammed");
                Some(status_patch(lock.id(), Value::from(LOCK_JAMMED_STATUS)))
            }
            None => {
                debug!(name = %name, "Jam alert does not match any bound lock");
                None
            }
        }
    }

    /// First bound lock whose name is exactly `name`
    pub fn lock_named(&self, name: &str) -> Option<&Device> {
        self.devices()
            .find(|device| device.kind() == DeviceKind::Lock && device.name() == name)
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices_by_id.get(id)
    }

    /// Bound records in bind order
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.order.iter().filter_map(|id| self.devices_by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.devices_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices_by_id.is_empty()
    }

    pub fn panel_device_id(&self) -> Option<&DeviceId> {
        self.panel_device_id.as_ref()
    }

    pub fn system_panel_id(&self) -> Option<&DeviceId> {
        self.system_panel_id.as_ref()
    }

    pub fn last_snapshot_time(&self) -> Option<DateTime<Utc>> {
        self.last_snapshot_time
    }
}

/// Name of the lock in an `Alert: <name> failed to lock` subject
pub fn lock_name_from_subject(subject: &str) -> Option<&str> {
    if !subject.contains(JAM_ALERT_SUFFIX.trim_start()) {
        return None;
    }
    let (_, rest) = subject.split_once(JAM_ALERT_PREFIX)?;
    let name = rest.split_once(JAM_ALERT_SUFFIX).map_or(rest, |(name, _)| name);
    Some(name).filter(|name| !name.is_empty())
}

fn status_patch(id: &DeviceId, status: Value) -> Value {
    let mut patch = Map::new();
    patch.insert(field::ID.to_string(), id.to_value());
    patch.insert(field::STATUS.to_string(), status);
    Value::Object(patch)
}
