use super::DeviceKind;
use crate::config::BridgeConfig;
use crate::dictionary::{
    field, garage_door_state, operating_mode, operating_state, security_state, LOCK_JAMMED_STATUS,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized, device-class-specific view of a record's data
///
/// This is what accessory adapters render; it is recomputed from `data` on
/// every notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessoryState {
    Contact { contact: ContactState, tampered: bool },
    Smoke { detected: bool, tampered: bool },
    CarbonMonoxide { abnormal: bool, tampered: bool },
    Motion { detected: bool, tampered: bool },
    Lock { current: LockState, target_secured: bool },
    Thermostat(ThermostatState),
    GarageDoor { current: DoorState, target: DoorTarget },
    SecuritySystem { current: Option<SecurityState> },
    Camera { visitor_detected: bool },
    Switch { on: bool },
    Dimmer { on: bool, brightness: Option<u8> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactState {
    Detected,
    NotDetected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Unsecured,
    Secured,
    Jammed,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityState {
    Disarmed,
    StayArm,
    AwayArm,
    AlarmTriggered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Open,
    Closed,
    Opening,
    Closing,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorTarget {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingCooling {
    Off,
    Heat,
    Cool,
    Auto,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThermostatState {
    pub current: Option<HeatingCooling>,
    pub target: Option<HeatingCooling>,
    /// Degrees Celsius as reported by the vendor
    pub current_temperature: Option<f64>,
    pub cool_set_point: Option<f64>,
    pub heat_set_point: Option<f64>,
    pub humidity: Option<f64>,
    pub display_celsius: bool,
}

/// Battery characteristics shared by battery-powered kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub level: u8,
    pub low: bool,
}

impl AccessoryState {
    pub fn render(kind: DeviceKind, data: &Value, config: &BridgeConfig) -> Self {
        let status = data.get(field::STATUS);
        let tampered = truthy(data.get(field::TAMPER));

        match kind {
            DeviceKind::ContactSensor => AccessoryState::Contact {
                contact: if truthy(status) {
                    ContactState::NotDetected
                } else {
                    ContactState::Detected
                },
                tampered,
            },
            DeviceKind::SmokeSensor => AccessoryState::Smoke {
                detected: truthy(status),
                tampered,
            },
            DeviceKind::CarbonMonoxideSensor => AccessoryState::CarbonMonoxide {
                abnormal: truthy(status),
                tampered,
            },
            DeviceKind::MotionSensor => AccessoryState::Motion {
                detected: truthy(status),
                tampered,
            },
            DeviceKind::Lock => {
                let current = lock_state(status);
                AccessoryState::Lock {
                    current,
                    target_secured: current == LockState::Secured,
                }
            }
            DeviceKind::Thermostat => AccessoryState::Thermostat(ThermostatState {
                current: match integer(data.get(field::OPERATING_STATE)) {
                    Some(operating_state::IDLE) => Some(HeatingCooling::Off),
                    Some(operating_state::HEATING) => Some(HeatingCooling::Heat),
                    Some(operating_state::COOLING) => Some(HeatingCooling::Cool),
                    _ => None,
                },
                target: match integer(data.get(field::OPERATING_MODE)) {
                    Some(operating_mode::OFF) => Some(HeatingCooling::Off),
                    Some(operating_mode::HEAT) => Some(HeatingCooling::Heat),
                    Some(operating_mode::COOL) => Some(HeatingCooling::Cool),
                    Some(operating_mode::AUTO) | Some(operating_mode::ECO) => {
                        Some(HeatingCooling::Auto)
                    }
                    _ => None,
                },
                current_temperature: number(data.get(field::CURRENT_TEMPERATURE)),
                cool_set_point: number(data.get(field::COOL_SET_POINT)),
                heat_set_point: number(data.get(field::HEAT_SET_POINT)),
                humidity: number(data.get(field::HUMIDITY)),
                display_celsius: config.temperature_units.eq_ignore_ascii_case("c"),
            }),
            DeviceKind::GarageDoor => {
                let code = integer(status);
                let current = match code {
                    Some(garage_door_state::UNKNOWN) | Some(garage_door_state::CLOSED) => {
                        DoorState::Closed
                    }
                    Some(garage_door_state::CLOSING) => DoorState::Closing,
                    Some(garage_door_state::OPENING) => DoorState::Opening,
                    Some(garage_door_state::OPENED) => DoorState::Open,
                    _ => DoorState::Stopped,
                };
                let target = match code {
                    Some(garage_door_state::OPENING) | Some(garage_door_state::OPENED) => {
                        DoorTarget::Open
                    }
                    _ => DoorTarget::Closed,
                };
                AccessoryState::GarageDoor { current, target }
            }
            DeviceKind::Panel => AccessoryState::SecuritySystem {
                current: integer(status).and_then(security_state_of),
            },
            DeviceKind::Camera => AccessoryState::Camera {
                visitor_detected: truthy(data.get(field::VISITOR_DETECTED)),
            },
            DeviceKind::LightSwitch => AccessoryState::Switch {
                on: truthy(status),
            },
            DeviceKind::DimmerSwitch => AccessoryState::Dimmer {
                on: truthy(status),
                brightness: integer(data.get(field::VALUE))
                    .map(|v| v.clamp(0, 100) as u8),
            },
        }
    }
}

impl BatteryStatus {
    /// Battery view for kinds that carry one; level defaults to 100
    pub fn render(kind: DeviceKind, data: &Value, config: &BridgeConfig) -> Option<Self> {
        if !kind.has_battery() {
            return None;
        }
        let level = integer(data.get(field::BATTERY_LEVEL))
            .map_or(100, |v| v.clamp(0, 100) as u8);
        let below_threshold = config
            .low_battery_threshold
            .map_or(false, |threshold| level <= threshold);

        Some(BatteryStatus {
            level,
            low: truthy(data.get(field::LOW_BATTERY)) || below_threshold,
        })
    }
}

fn lock_state(status: Option<&Value>) -> LockState {
    match status {
        Some(Value::Bool(false)) => LockState::Unsecured,
        Some(Value::Bool(true)) => LockState::Secured,
        Some(v) if v.as_i64() == Some(LOCK_JAMMED_STATUS) => LockState::Jammed,
        _ => LockState::Unknown,
    }
}

fn security_state_of(code: i64) -> Option<SecurityState> {
    match code {
        security_state::DISARMED | security_state::DISABLED | security_state::WALK_TEST => {
            Some(SecurityState::Disarmed)
        }
        security_state::ARMING_AWAY_IN_EXIT_DELAY
        | security_state::ARMED_AWAY
        | security_state::ARMED_AWAY_IN_ENTRY_DELAY => Some(SecurityState::AwayArm),
        security_state::ARMING_STAY_IN_EXIT_DELAY
        | security_state::ARMED_STAY
        | security_state::ARMED_STAY_IN_ENTRY_DELAY => Some(SecurityState::StayArm),
        security_state::ALARM | security_state::ALARM_FIRE => Some(SecurityState::AlarmTriggered),
        _ => None,
    }
}

/// Loose truthiness of vendor flags (`false`, `0`, `""` and null are false)
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn integer(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value.as_i64().or_else(|| value.as_f64().map(|f| f.round() as i64))
}

fn number(value: Option<&Value>) -> Option<f64> {
    value?.as_f64()
}
