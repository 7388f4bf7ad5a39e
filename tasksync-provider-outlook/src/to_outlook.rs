use chrono::{DateTime, Timelike, Utc};
use serde_json::{Value, json};
use tasksync_core::transforms::unexpected;
use tasksync_core::{FieldValue, TaskStatus, TransformError};

/// Seconds part of `dateTimeTimeZone.dateTime`; Graph adds a 7-digit fraction.
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn body(value: &FieldValue) -> Result<Option<Value>, TransformError> {
    let content = match value {
        FieldValue::Text(s) => s.as_str(),
        FieldValue::Null => "",
        other => return Err(unexpected(other)),
    };
    Ok(Some(json!({ "content": content, "contentType": "text" })))
}

pub fn status(value: &FieldValue) -> Result<Option<Value>, TransformError> {
    let status = match value {
        FieldValue::Status(TaskStatus::Todo) => "notStarted",
        FieldValue::Status(TaskStatus::InProgress) => "inProgress",
        FieldValue::Status(TaskStatus::Completed) => "completed",
        other => return Err(unexpected(other)),
    };
    Ok(Some(status.into()))
}

/// Always sent in UTC.
pub fn date_time(value: &FieldValue) -> Result<Option<Value>, TransformError> {
    match value {
        FieldValue::Timestamp(t) => Ok(Some(json!({
            "dateTime": graph_date_time(t),
            "timeZone": "UTC",
        }))),
        FieldValue::Null => Ok(Some(Value::Null)),
        other => Err(unexpected(other)),
    }
}

/// `2024-01-05T08:00:00.0000000`, in 100ns ticks.
pub fn graph_date_time(t: &DateTime<Utc>) -> String {
    format!("{}.{:07}", t.format(DATE_TIME_FORMAT), t.nanosecond() % 1_000_000_000 / 100)
}

pub fn importance(value: &FieldValue) -> Result<Option<Value>, TransformError> {
    match value {
        FieldValue::Priority(p) => Ok(Some(importance_for(*p).into())),
        FieldValue::Null => Ok(Some("normal".into())),
        other => Err(unexpected(other)),
    }
}

pub fn importance_for(priority: u8) -> &'static str {
    match priority {
        0 | 1 => "high",
        2 => "normal",
        _ => "low",
    }
}
