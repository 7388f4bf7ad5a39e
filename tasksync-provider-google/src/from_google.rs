use chrono::{DateTime, Utc};
use tasksync_core::transforms::{parse_timestamp, text_or_null};
use tasksync_core::{FieldValue, Inbound, TaskStatus, TransformError};

use crate::to_google::STATUS_COMPLETED;

/// Google reads task bodies from `notes`; fall back to the canonical
/// `description` key for payloads we built ourselves.
pub fn description(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    inbound
        .payload
        .get("notes")
        .or(inbound.raw)
        .map(text_or_null)
        .transpose()
}

/// Only an explicit "completed" completes a task. Any other status that is
/// sent, null included, is not completed; an in-progress task stays in
/// progress since Google cannot tell it apart from a new one. A payload
/// without `status` leaves the local status alone.
pub fn status(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    let Some(raw) = inbound.raw else {
        return Ok(None);
    };
    let completed = raw
        .as_str()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case(STATUS_COMPLETED));

    let status = match (completed, inbound.existing.status) {
        (true, _) => TaskStatus::Completed,
        (false, TaskStatus::InProgress) => TaskStatus::InProgress,
        (false, _) => TaskStatus::Todo,
    };

    Ok(Some(FieldValue::Status(status)))
}

/// Google stores due dates without a time of day. If the date matches the
/// local one, keep the local time.
pub fn due(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    let Some(raw) = inbound.raw else {
        return Ok(None);
    };

    match parse_timestamp(raw)? {
        FieldValue::Timestamp(t) => Ok(Some(FieldValue::Timestamp(
            same_day_as(inbound.existing.due_date, t).unwrap_or(t),
        ))),
        other => Ok(Some(other)),
    }
}

fn same_day_as(local: Option<DateTime<Utc>>, remote: DateTime<Utc>) -> Option<DateTime<Utc>> {
    local.filter(|l| l.date_naive() == remote.date_naive())
}
