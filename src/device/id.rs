use crate::dictionary::field;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Vendor-assigned device identifier
///
/// The vendor mixes integer and string forms of the same id, so a string
/// holding an integer is normalized to `Num`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceId {
    Num(i64),
    Text(String),
}

impl DeviceId {
    /// Interpret a JSON value as an identifier
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(DeviceId::Num),
            Value::String(s) if !s.is_empty() => Some(DeviceId::from(s.as_str())),
            _ => None,
        }
    }

    /// Identifier carried in a record's `Id` field
    pub fn of(record: &Value) -> Option<Self> {
        record.get(field::ID).and_then(Self::from_value)
    }

    pub fn to_value(&self) -> Value {
        match self {
            DeviceId::Num(n) => Value::from(*n),
            DeviceId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl From<i64> for DeviceId {
    fn from(n: i64) -> Self {
        DeviceId::Num(n)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(n) => DeviceId::Num(n),
            Err(_) => DeviceId::Text(s.to_string()),
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceId::Num(n) => write!(f, "{}", n),
            DeviceId::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DeviceId::Num(n) => serializer.serialize_i64(*n),
            DeviceId::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DeviceId::from_value(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid device identifier: {}", value))
        })
    }
}
