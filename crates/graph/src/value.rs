use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

/// A leaf of a decoded response tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Tree-shaped decoded payload. Mappings keep the order their keys arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedValue {
    Scalar(Scalar),
    Mapping(Vec<(String, NestedValue)>),
    Sequence(Vec<NestedValue>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Strings render bare, everything else renders as its JSON literal.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Number(n) => Value::Number(n),
            Scalar::String(s) => Value::String(s),
        }
    }
}

impl NestedValue {
    pub fn empty_mapping() -> Self {
        NestedValue::Mapping(Vec::new())
    }

    /// Look up a key in a mapping node.
    pub fn get(&self, key: &str) -> Option<&NestedValue> {
        match self {
            NestedValue::Mapping(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, NestedValue::Scalar(Scalar::Null))
    }
}

impl From<Value> for NestedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => NestedValue::Scalar(Scalar::Null),
            Value::Bool(b) => NestedValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => NestedValue::Scalar(Scalar::Number(n)),
            Value::String(s) => NestedValue::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                NestedValue::Sequence(items.into_iter().map(NestedValue::from).collect())
            }
            Value::Object(map) => NestedValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, NestedValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<NestedValue> for Value {
    fn from(value: NestedValue) -> Self {
        match value {
            NestedValue::Scalar(scalar) => scalar.into(),
            NestedValue::Sequence(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            NestedValue::Mapping(entries) => {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k, v.into());
                }
                Value::Object(map)
            }
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Number(n) => Ok(Scalar::Number(n)),
            Value::String(s) => Ok(Scalar::String(s)),
            _ => Err(serde::de::Error::custom("expected a scalar value")),
        }
    }
}

impl Serialize for NestedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NestedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(NestedValue::from)
    }
}
