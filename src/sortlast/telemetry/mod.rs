mod stopwatch;

pub use stopwatch::Stopwatch;

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("telemetry key '{0}' recorded twice")]
    DuplicateKey(String),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

macro_rules! impl_value_from {
    ($variant:ident: $($ty:ty => $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant($conv(v))
                }
            }
        )*
    };
}

impl_value_from!(Int: i64 => |v| v, i32 => i64::from, u32 => i64::from, usize => |v: usize| v as i64, u64 => |v: u64| v as i64);
impl_value_from!(Float: f64 => |v| v, f32 => widen_f32);
impl_value_from!(Text: String => |v| v, &str => str::to_owned);

// Widens through the shortest decimal spelling so `-0.05f32` reports as
// `-0.05` rather than its exact binary expansion.
fn widen_f32(v: f32) -> f64 {
    v.to_string().parse().unwrap_or(f64::from(v))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TelemetryRecorder {
    entries: Vec<(String, Value)>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Result<(), TelemetryError> {
        let key = key.into();
        if self.get(&key).is_some() {
            return Err(TelemetryError::DuplicateKey(key));
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn to_yaml(&self) -> Result<String, TelemetryError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn write_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), TelemetryError> {
        std::fs::write(path.as_ref(), self.to_yaml()?)?;
        log::info!("Wrote report to {}", path.as_ref().display());
        Ok(())
    }
}

impl Serialize for TelemetryRecorder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
impl TelemetryRecorder {
    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}
