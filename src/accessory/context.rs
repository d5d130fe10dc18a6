use super::kind::{device_type_of, equipment_code_of};
use super::DeviceKind;
use crate::config::BridgeConfig;
use crate::device::DeviceId;
use crate::dictionary::{device_type, equipment_code, field};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};

/// Accessory category presented to the accessory framework
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Other,
    Sensor,
    Door,
    Window,
    DoorLock,
    Thermostat,
    GarageDoorOpener,
    SecuritySystem,
    IpCamera,
    VideoDoorbell,
    Switch,
}

/// Service a switch is exposed as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchService {
    Lightbulb,
    Fan,
    Switch,
}

/// Persistent description of an accessory bound to a device
///
/// Only `id`, `name` and `device_class_name` are required to bind; the
/// remaining fields describe the accessory when it is first created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessoryContext {
    pub id: DeviceId,
    pub name: String,
    pub device_class_name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_service: Option<SwitchService>,
}

impl AccessoryContext {
    /// Minimal context, as restored from an accessory cache
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_class_name: kind.class_name().to_string(),
            category: Category::Other,
            manufacturer: String::new(),
            model: String::new(),
            serial: String::new(),
            firmware: None,
            switch_service: None,
        }
    }
}

/// Build the accessory context for a raw device record.
///
/// Returns `None` for records without an identifier, vendor service types,
/// devices no class applies to, and types the configuration ignores.
pub fn create_device_accessory(data: &Value, config: &BridgeConfig) -> Option<AccessoryContext> {
    let id = DeviceId::of(data)?;
    let name = data
        .get(field::NAME)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let type_name = device_type_of(data).unwrap_or_default();

    if device_type::IRRELEVANT.iter().any(|t| *t == type_name) {
        debug!(device_id = %id, device_type = %type_name, "Ignored unusable device");
        return None;
    }

    let kind = match DeviceKind::classify(data) {
        Some(kind) => kind,
        None => {
            info!(
                device_id = %id,
                device_type = %type_name,
                equipment_code = ?equipment_code_of(data),
                name = %name,
                "Device not (yet) supported"
            );
            return None;
        }
    };

    if config.ignores_type(type_name) {
        info!(device_id = %id, device_type = %type_name, name = %name, "Ignored device");
        return None;
    }

    let serial = format!(
        "{:08x}:{:08x}:{}",
        unsigned(data.get(field::SERIAL_NUMBER_32BIT)),
        unsigned(data.get(field::SERIAL_NUMBER)),
        id
    );

    let mut manufacturer = "Vivint".to_string();
    let mut model = match equipment_code_of(data) {
        Some(code) => equipment_code::name_of(code)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string()),
        None => kind.class_name().to_string(),
    };

    // Third-party devices carry "<maker>_<model>" in ActualType
    if let Some(actual) = data.get(field::ACTUAL_TYPE).and_then(Value::as_str) {
        let mut parts = actual.split('_');
        if let Some(maker) = parts.next().filter(|p| !p.is_empty()) {
            manufacturer = maker.to_uppercase();
        }
        if let Some(m) = parts.next() {
            model = m.to_uppercase();
        }
    }

    let firmware = [field::CURRENT_SOFTWARE_VERSION, field::SOFTWARE_VERSION]
        .iter()
        .filter_map(|key| data.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    Some(AccessoryContext {
        category: infer_category(kind, &name),
        switch_service: infer_switch_service(kind, &name),
        id,
        name,
        device_class_name: kind.class_name().to_string(),
        manufacturer,
        model,
        serial,
        firmware,
    })
}

/// Category derived from kind and name
pub fn infer_category(kind: DeviceKind, name: &str) -> Category {
    match kind {
        DeviceKind::ContactSensor => {
            if has_word(name, &["window"]) {
                Category::Window
            } else if has_word(name, &["door", "doorway"]) {
                Category::Door
            } else {
                Category::Sensor
            }
        }
        DeviceKind::SmokeSensor | DeviceKind::CarbonMonoxideSensor | DeviceKind::MotionSensor => {
            Category::Sensor
        }
        DeviceKind::Lock => Category::DoorLock,
        DeviceKind::Thermostat => Category::Thermostat,
        DeviceKind::GarageDoor => Category::GarageDoorOpener,
        DeviceKind::Panel => Category::SecuritySystem,
        DeviceKind::Camera => {
            if name.to_lowercase().contains("doorbell") {
                Category::VideoDoorbell
            } else {
                Category::IpCamera
            }
        }
        DeviceKind::LightSwitch | DeviceKind::DimmerSwitch => Category::Switch,
    }
}

/// Service flavour of switch kinds; binary switches are named by use
pub fn infer_switch_service(kind: DeviceKind, name: &str) -> Option<SwitchService> {
    match kind {
        DeviceKind::LightSwitch if has_word(name, &["light"]) => Some(SwitchService::Lightbulb),
        DeviceKind::LightSwitch if has_word(name, &["fan"]) => Some(SwitchService::Fan),
        DeviceKind::LightSwitch => Some(SwitchService::Switch),
        DeviceKind::DimmerSwitch => Some(SwitchService::Lightbulb),
        _ => None,
    }
}

/// Cached accessories split against the ones a fresh snapshot produced
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccessoryPlan {
    /// Cached accessories still present in the snapshot
    pub retained: Vec<AccessoryContext>,
    /// Snapshot accessories with no cached counterpart
    pub added: Vec<AccessoryContext>,
    /// Cached accessories whose device is gone
    pub removed: Vec<AccessoryContext>,
}

impl AccessoryPlan {
    /// Everything that should be bound, cached first
    pub fn to_bind(&self) -> impl Iterator<Item = &AccessoryContext> {
        self.retained.iter().chain(self.added.iter())
    }
}

pub fn reconcile_accessories(
    cached: Vec<AccessoryContext>,
    created: Vec<AccessoryContext>,
) -> AccessoryPlan {
    let created_ids: HashSet<DeviceId> = created.iter().map(|c| c.id.clone()).collect();
    let cached_ids: HashSet<DeviceId> = cached.iter().map(|c| c.id.clone()).collect();

    let (retained, removed): (Vec<_>, Vec<_>) = cached
        .into_iter()
        .partition(|c| created_ids.contains(&c.id));
    let added = created
        .into_iter()
        .filter(|c| !cached_ids.contains(&c.id))
        .collect();

    AccessoryPlan {
        retained,
        added,
        removed,
    }
}

fn unsigned(value: Option<&Value>) -> u64 {
    value.and_then(Value::as_u64).unwrap_or(0)
}

/// Case-insensitive whole-word match
fn has_word(text: &str, words: &[&str]) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| words.iter().any(|w| token.eq_ignore_ascii_case(w)))
}
