//! Field names and typed field values.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{SyncError, TransformError};
use crate::task::TaskStatus;

/// The sync-eligible fields of a `TaskRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    Title,
    Description,
    Status,
    DueDate,
    CompletedAt,
    Priority,
    Tags,
}

impl TaskField {
    pub const ALL: [TaskField; 7] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Status,
        TaskField::DueDate,
        TaskField::CompletedAt,
        TaskField::Priority,
        TaskField::Tags,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Description => "description",
            TaskField::Status => "status",
            TaskField::DueDate => "due_date",
            TaskField::CompletedAt => "completed_at",
            TaskField::Priority => "priority",
            TaskField::Tags => "tags",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskField {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskField::ALL
            .into_iter()
            .find(|f| f.name() == s.trim())
            .ok_or_else(|| SyncError::UnknownField(s.to_string()))
    }
}

/// Internal value of a single field.
///
/// `Null` is an explicit "no value". A field the provider did not send at
/// all is not a `FieldValue`; see `CandidateValue::Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Status(TaskStatus),
    Timestamp(DateTime<Utc>),
    Priority(u8),
    Tags(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Text(_) => "text",
            FieldValue::Status(_) => "status",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Priority(_) => "priority",
            FieldValue::Tags(_) => "tags",
        }
    }

    /// Canonical JSON form, used by pass-through mapping entries.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Status(s) => Value::String(s.as_str().to_string()),
            FieldValue::Timestamp(t) => {
                Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            FieldValue::Priority(p) => Value::from(*p),
            FieldValue::Tags(tags) => Value::from(tags.clone()),
        }
    }

    /// Decode a raw JSON value into the type `field` expects.
    pub fn from_json(field: TaskField, value: &Value) -> Result<FieldValue, TransformError> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }

        let mismatch = || TransformError::new(format!("unexpected JSON value {value}"));

        match field {
            TaskField::Title | TaskField::Description => value
                .as_str()
                .map(|s| FieldValue::Text(s.to_string()))
                .ok_or_else(mismatch),
            TaskField::Status => {
                let s = value.as_str().ok_or_else(mismatch)?;
                Ok(FieldValue::Status(s.parse()?))
            }
            TaskField::DueDate | TaskField::CompletedAt => {
                let s = value.as_str().ok_or_else(mismatch)?;
                DateTime::parse_from_rfc3339(s)
                    .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
                    .map_err(|e| TransformError::new(format!("invalid timestamp '{s}': {e}")))
            }
            TaskField::Priority => value
                .as_u64()
                .and_then(|p| u8::try_from(p).ok())
                .map(FieldValue::Priority)
                .ok_or_else(mismatch),
            TaskField::Tags => value
                .as_array()
                .ok_or_else(mismatch)?
                .iter()
                .map(|v| v.as_str().map(String::from).ok_or_else(mismatch))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::Tags),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s:?}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map(FieldValue::Timestamp).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_from_json_decodes_by_field_type() {
        assert_eq!(
            FieldValue::from_json(TaskField::Status, &json!("in_progress")).unwrap(),
            FieldValue::Status(TaskStatus::InProgress)
        );
        assert_eq!(
            FieldValue::from_json(TaskField::DueDate, &json!("2024-01-05T10:00:00+02:00"))
                .unwrap(),
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap())
        );
        assert_eq!(
            FieldValue::from_json(TaskField::Tags, &json!(["a", "b"])).unwrap(),
            FieldValue::Tags(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            FieldValue::from_json(TaskField::Priority, &Value::Null).unwrap(),
            FieldValue::Null
        );
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        assert!(FieldValue::from_json(TaskField::Title, &json!(42)).is_err());
        assert!(FieldValue::from_json(TaskField::Priority, &json!(300)).is_err());
        assert!(FieldValue::from_json(TaskField::DueDate, &json!("tomorrow")).is_err());
        assert!(FieldValue::from_json(TaskField::Tags, &json!(["ok", 1])).is_err());
    }

    #[test]
    fn test_timestamp_json_uses_millisecond_utc() {
        let t = FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(t.to_json(), json!("2024-01-01T00:00:00.000Z"));
    }

    #[test]
    fn test_task_field_from_str() {
        assert_eq!("due_date".parse::<TaskField>().unwrap(), TaskField::DueDate);
        assert!("dueDate".parse::<TaskField>().is_err());
    }
}
