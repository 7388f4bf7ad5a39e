//! Provider-shaped task payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaMismatchError;

/// A task as a provider exposes it: a JSON object whose shape is only
/// known to that provider's `FieldMapper`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalTaskPayload(Map<String, Value>);

impl ExternalTaskPayload {
    pub fn new() -> Self {
        ExternalTaskPayload(Map::new())
    }

    /// Accept any JSON value that is an object.
    pub fn from_value(value: Value) -> Result<Self, SchemaMismatchError> {
        match value {
            Value::Object(map) => Ok(ExternalTaskPayload(map)),
            other => Err(SchemaMismatchError::new(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a nested value by dotted path, e.g. `body.content`.
    /// Returns `None` if any segment is missing or not an object.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for ExternalTaskPayload {
    type Error = SchemaMismatchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ExternalTaskPayload::from_value(value)
    }
}

impl From<Map<String, Value>> for ExternalTaskPayload {
    fn from(map: Map<String, Value>) -> Self {
        ExternalTaskPayload(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
