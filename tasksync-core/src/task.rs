//! Provider-neutral task types.
//!
//! `TaskRecord` is the canonical local task. Providers never see it
//! directly: a `FieldMapper` converts it to and from provider payloads.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, TransformError};
use crate::field::{FieldValue, TaskField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TransformError;

    /// Case-insensitive; accepts `in-progress` as well as `IN_PROGRESS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            _ => Err(TransformError::new(format!("unknown task status '{s}'"))),
        }
    }
}

/// External providers a task can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Outlook,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Google, ProviderKind::Outlook];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Outlook => "outlook",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SyncError::UnknownProvider(s.to_string()))
    }
}

/// Where a task lives on the provider side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLink {
    pub provider: ProviderKind,
    pub external_id: String,
}

/// A task as stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// 1 is the most urgent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<ProviderLink>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        TaskRecord {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            due_date: None,
            completed_at: None,
            priority: None,
            tags: Vec::new(),
            link: None,
        }
    }

    pub fn linked(mut self, provider: ProviderKind, external_id: impl Into<String>) -> Self {
        self.link = Some(ProviderLink {
            provider,
            external_id: external_id.into(),
        });
        self
    }

    /// Read one sync-eligible field as a `FieldValue`.
    pub fn get(&self, field: TaskField) -> FieldValue {
        match field {
            TaskField::Title => FieldValue::Text(self.title.clone()),
            TaskField::Description => self.description.clone().into(),
            TaskField::Status => FieldValue::Status(self.status),
            TaskField::DueDate => self.due_date.into(),
            TaskField::CompletedAt => self.completed_at.into(),
            TaskField::Priority => self
                .priority
                .map(FieldValue::Priority)
                .unwrap_or(FieldValue::Null),
            TaskField::Tags => FieldValue::Tags(self.tags.clone()),
        }
    }

    /// Write one sync-eligible field. Fails if the value has the wrong
    /// kind for the field; the record is left untouched in that case.
    pub fn set(&mut self, field: TaskField, value: FieldValue) -> Result<(), TransformError> {
        match (field, value) {
            (TaskField::Title, FieldValue::Text(s)) => self.title = s,
            (TaskField::Description, FieldValue::Text(s)) => self.description = Some(s),
            (TaskField::Description, FieldValue::Null) => self.description = None,
            (TaskField::Status, FieldValue::Status(s)) => self.status = s,
            (TaskField::DueDate, FieldValue::Timestamp(t)) => self.due_date = Some(t),
            (TaskField::DueDate, FieldValue::Null) => self.due_date = None,
            (TaskField::CompletedAt, FieldValue::Timestamp(t)) => self.completed_at = Some(t),
            (TaskField::CompletedAt, FieldValue::Null) => self.completed_at = None,
            (TaskField::Priority, FieldValue::Priority(p)) => self.priority = Some(p),
            (TaskField::Priority, FieldValue::Null) => self.priority = None,
            (TaskField::Tags, FieldValue::Tags(t)) => self.tags = t,
            (TaskField::Tags, FieldValue::Null) => self.tags.clear(),
            (field, value) => {
                return Err(TransformError::new(format!(
                    "cannot store {} in '{}'",
                    value.kind(),
                    field
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_get_set_roundtrip_every_field() {
        let mut task = TaskRecord::new("t1", "Write report");
        task.description = Some("quarterly".into());
        task.status = TaskStatus::InProgress;
        task.due_date = Some(Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap());
        task.priority = Some(2);
        task.tags = vec!["work".into()];

        let mut copy = TaskRecord::new("t1", "");
        for field in TaskField::ALL {
            copy.set(field, task.get(field)).unwrap();
        }
        assert_eq!(copy, task);
    }

    #[test]
    fn test_set_rejects_null_title() {
        let mut task = TaskRecord::new("t1", "Keep me");
        assert!(task.set(TaskField::Title, FieldValue::Null).is_err());
        assert_eq!(task.title, "Keep me");
    }

    #[test]
    fn test_status_from_str_is_case_insensitive() {
        assert_eq!("completed".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("Google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert!(matches!(
            "asana".parse::<ProviderKind>(),
            Err(SyncError::UnknownProvider(_))
        ));
    }
}
