// Wire shapes of vendor snapshots and real-time messages

use crate::device::DeviceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod timestamp;

pub use timestamp::{parse_timestamp, parse_timestamp_str};

/// Full system snapshot from the polling transport
///
/// The panel's arm state lives in the system-level `Status`, not in the
/// panel's own device entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SystemSnapshot {
    #[serde(rename = "Devices", default)]
    pub devices: Vec<Value>,

    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl SystemSnapshot {
    /// Find the device entry with the given identifier
    pub fn device_mut(&mut self, id: &DeviceId) -> Option<&mut Value> {
        self.devices
            .iter_mut()
            .find(|d| DeviceId::of(d).as_ref() == Some(id))
    }
}

/// Real-time message from the publish/subscribe feed
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Message {
    /// Origin identifier (the system panel id for system-status messages)
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DeviceId>,

    /// Object type of the envelope (e.g. `inbox_message`)
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

/// Body of a real-time message
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MessageData {
    #[serde(rename = "PlatformContext", default, skip_serializing_if = "Option::is_none")]
    pub platform_context: Option<PlatformContext>,

    /// Per-device patches
    #[serde(rename = "Devices", default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Value>>,

    /// System-wide arm state
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    /// Free-text alert subject
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlatformContext {
    #[serde(rename = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

impl MessageData {
    /// Raw origin timestamp, if the platform context carries one
    pub fn origin_timestamp(&self) -> Option<&Value> {
        self.platform_context.as_ref()?.timestamp.as_ref()
    }
}

/// Item delivered to the bridge by either transport
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    /// Periodic poll result with its freshness timestamp
    Snapshot {
        snapshot: SystemSnapshot,
        timestamp: Value,
    },
    /// Push-feed message
    Message { message: Message },
}

impl Inbound {
    pub fn snapshot(snapshot: SystemSnapshot, timestamp: DateTime<Utc>) -> Self {
        Inbound::Snapshot {
            snapshot,
            timestamp: Value::String(timestamp.to_rfc3339()),
        }
    }

    pub fn message(message: Message) -> Self {
        Inbound::Message { message }
    }
}
