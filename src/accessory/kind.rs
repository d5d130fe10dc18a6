use crate::dictionary::{device_type, equipment_code, field};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of device classes the bridge can mirror
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    ContactSensor,
    SmokeSensor,
    CarbonMonoxideSensor,
    MotionSensor,
    Lock,
    Thermostat,
    GarageDoor,
    Panel,
    Camera,
    LightSwitch,
    DimmerSwitch,
}

type Predicate = fn(&Value) -> bool;

/// Applicability predicates in priority order; the first match wins.
const DISPATCH: [(DeviceKind, Predicate); 11] = [
    (DeviceKind::ContactSensor, is_contact_sensor),
    (DeviceKind::SmokeSensor, is_smoke_sensor),
    (DeviceKind::CarbonMonoxideSensor, is_carbon_monoxide_sensor),
    (DeviceKind::MotionSensor, is_motion_sensor),
    (DeviceKind::Lock, is_lock),
    (DeviceKind::Thermostat, is_thermostat),
    (DeviceKind::GarageDoor, is_garage_door),
    (DeviceKind::Panel, is_panel),
    (DeviceKind::Camera, is_camera),
    (DeviceKind::LightSwitch, is_binary_switch),
    (DeviceKind::DimmerSwitch, is_multilevel_switch),
];

impl DeviceKind {
    /// All kinds in dispatch order
    pub fn all() -> impl Iterator<Item = DeviceKind> {
        DISPATCH.iter().map(|(kind, _)| *kind)
    }

    /// Select the device class for a raw vendor record
    pub fn classify(data: &Value) -> Option<DeviceKind> {
        DISPATCH
            .iter()
            .find(|(_, applies)| applies(data))
            .map(|(kind, _)| *kind)
    }

    pub(crate) fn applies_to(self, data: &Value) -> bool {
        DISPATCH
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or(false, |(_, applies)| applies(data))
    }

    /// Stable name stored in accessory contexts
    pub fn class_name(self) -> &'static str {
        match self {
            DeviceKind::ContactSensor => "ContactSensor",
            DeviceKind::SmokeSensor => "SmokeSensor",
            DeviceKind::CarbonMonoxideSensor => "CarbonMonoxideSensor",
            DeviceKind::MotionSensor => "MotionSensor",
            DeviceKind::Lock => "Lock",
            DeviceKind::Thermostat => "Thermostat",
            DeviceKind::GarageDoor => "GarageDoor",
            DeviceKind::Panel => "Panel",
            DeviceKind::Camera => "Camera",
            DeviceKind::LightSwitch => "LightSwitch",
            DeviceKind::DimmerSwitch => "DimmerSwitch",
        }
    }

    pub fn from_class_name(name: &str) -> Option<DeviceKind> {
        Self::all().find(|kind| kind.class_name() == name)
    }

    /// Kinds that expose a battery service
    pub fn has_battery(self) -> bool {
        matches!(
            self,
            DeviceKind::ContactSensor
                | DeviceKind::SmokeSensor
                | DeviceKind::CarbonMonoxideSensor
                | DeviceKind::MotionSensor
                | DeviceKind::Lock
        )
    }
}

pub(crate) fn device_type_of(data: &Value) -> Option<&str> {
    data.get(field::TYPE).and_then(Value::as_str)
}

pub(crate) fn equipment_code_of(data: &Value) -> Option<i64> {
    match data.get(field::EQUIPMENT_CODE)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn has_type(data: &Value, expected: &str) -> bool {
    device_type_of(data) == Some(expected)
}

fn is_sensor_in(data: &Value, codes: &[i64]) -> bool {
    has_type(data, device_type::WIRELESS_SENSOR)
        && equipment_code_of(data).map_or(false, |code| codes.contains(&code))
}

fn is_contact_sensor(data: &Value) -> bool {
    is_sensor_in(data, equipment_code::CONTACT)
}

fn is_smoke_sensor(data: &Value) -> bool {
    is_sensor_in(data, equipment_code::SMOKE)
}

fn is_carbon_monoxide_sensor(data: &Value) -> bool {
    is_sensor_in(data, equipment_code::CARBON_MONOXIDE)
}

fn is_motion_sensor(data: &Value) -> bool {
    is_sensor_in(data, equipment_code::MOTION)
}

fn is_lock(data: &Value) -> bool {
    has_type(data, device_type::DOOR_LOCK)
}

fn is_thermostat(data: &Value) -> bool {
    has_type(data, device_type::THERMOSTAT)
}

fn is_garage_door(data: &Value) -> bool {
    has_type(data, device_type::GARAGE_DOOR)
}

fn is_panel(data: &Value) -> bool {
    has_type(data, device_type::PANEL)
}

fn is_camera(data: &Value) -> bool {
    has_type(data, device_type::CAMERA)
}

fn is_binary_switch(data: &Value) -> bool {
    has_type(data, device_type::BINARY_SWITCH)
}

fn is_multilevel_switch(data: &Value) -> bool {
    has_type(data, device_type::MULTILEVEL_SWITCH)
}
