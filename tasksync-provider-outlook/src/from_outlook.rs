use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use tasksync_core::transforms::text_or_null;
use tasksync_core::{FieldValue, Inbound, TaskStatus, TransformError};
use tracing::debug;

use crate::to_outlook::importance_for;

/// Task text lives in `body.content`. A body we cannot read is treated as
/// not sent rather than as cleared.
pub fn body(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    match inbound.raw {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(FieldValue::Null)),
        Some(Value::Object(_)) => match inbound.payload.lookup("body.content") {
            Some(content) => Ok(text_or_null(content).ok()),
            None => Ok(None),
        },
        Some(other) => {
            debug!("Ignoring malformed body: {}", other);
            Ok(None)
        }
    }
}

/// A payload without `status` says nothing about it. A status that is sent
/// but not recognized is not started.
pub fn status(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    let Some(raw) = inbound.raw else {
        return Ok(None);
    };
    let raw = raw.as_str().unwrap_or_default();
    let status = match raw.trim().to_ascii_lowercase().as_str() {
        "completed" => TaskStatus::Completed,
        "inprogress" | "waitingonothers" => TaskStatus::InProgress,
        _ => TaskStatus::Todo,
    };
    Ok(Some(FieldValue::Status(status)))
}

/// Graph `dateTimeTimeZone`: `{"dateTime": "2024-01-05T09:00:00.0000000", "timeZone": "UTC"}`.
pub fn date_time(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    let object = match inbound.raw {
        None => return Ok(None),
        Some(Value::Null) => return Ok(Some(FieldValue::Null)),
        Some(Value::Object(object)) => object,
        Some(other) => {
            debug!("Ignoring malformed dateTimeTimeZone: {}", other);
            return Ok(None);
        }
    };

    let Some(raw) = object.get("dateTime").and_then(Value::as_str) else {
        return Ok(None);
    };
    let zone = object
        .get("timeZone")
        .and_then(Value::as_str)
        .unwrap_or("UTC");

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| TransformError::new(format!("invalid dateTime '{raw}': {e}")))?;

    let utc = if zone.is_empty() || zone.eq_ignore_ascii_case("UTC") {
        naive.and_utc()
    } else {
        let tz: Tz = zone
            .parse()
            .map_err(|_| TransformError::new(format!("unknown time zone '{zone}'")))?;
        tz.from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| TransformError::new(format!("'{raw}' does not exist in {zone}")))?
            .with_timezone(&Utc)
    };

    Ok(Some(FieldValue::Timestamp(utc)))
}

/// Three importance levels against a finer local priority: keep the local
/// priority, or its absence, when it already falls in the same level.
pub fn importance(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    let raw = match inbound.raw {
        None => return Ok(None),
        Some(Value::Null) => return Ok(Some(FieldValue::Null)),
        Some(raw) => raw,
    };

    let level = raw
        .as_str()
        .map(|s| s.trim().to_ascii_lowercase())
        .ok_or_else(|| TransformError::new(format!("expected importance string, got {raw}")))?;

    let priority = match level.as_str() {
        "high" => 1,
        "normal" => 2,
        "low" => 3,
        other => return Err(TransformError::new(format!("unknown importance '{other}'"))),
    };

    // No priority goes out as "normal", so "normal" reads back as none.
    match inbound.existing.priority {
        None if level == "normal" => Ok(Some(FieldValue::Null)),
        Some(p) if importance_for(p) == importance_for(priority) => {
            Ok(Some(FieldValue::Priority(p)))
        }
        _ => Ok(Some(FieldValue::Priority(priority))),
    }
}

/// Categories become tags, duplicates dropped, order kept.
pub fn categories(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    let items = match inbound.raw {
        None => return Ok(None),
        Some(Value::Null) => return Ok(Some(FieldValue::Tags(Vec::new()))),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(TransformError::new(format!(
                "expected categories array, got {other}"
            )));
        }
    };

    let mut tags: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let tag = item
            .as_str()
            .ok_or_else(|| TransformError::new(format!("category is not a string: {item}")))?;
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    Ok(Some(FieldValue::Tags(tags)))
}
