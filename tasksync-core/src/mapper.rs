//! The per-provider field mapper contract.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{MappingError, SyncError, SyncResult};
use crate::field::{FieldValue, TaskField};
use crate::mapping::FieldMappingEntry;
use crate::payload::ExternalTaskPayload;
use crate::task::{ProviderKind, TaskRecord};

/// Converts tasks to and from one provider's payload shape.
///
/// Implementors only supply the mapping table; both conversions are
/// driven by it. Mappers hold no state and are shared as
/// `&'static dyn FieldMapper`.
pub trait FieldMapper: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// The mapping table, one entry per sync-eligible field.
    fn entries(&self) -> &[FieldMappingEntry];

    /// Fields the provider is authoritative for. When both sides changed
    /// one of these since the last sync, the provider's value wins unless
    /// the caller's policy says otherwise.
    fn provider_owned(&self) -> &[TaskField] {
        &[]
    }

    /// The provider's id for the task carried in `payload`, if any.
    fn external_id<'a>(&self, payload: &'a ExternalTaskPayload) -> Option<&'a str> {
        payload.get("id").and_then(Value::as_str)
    }

    fn entry(&self, field: TaskField) -> Option<&FieldMappingEntry> {
        self.entries().iter().find(|e| e.internal_field == field)
    }

    fn validate_entries(&self) -> SyncResult<()> {
        validate_entries(self.entries())
    }

    /// Build the outbound payload. Fields without an entry, and entries
    /// whose transform yields nothing, are left out.
    fn to_external(&self, task: &TaskRecord) -> Result<ExternalTaskPayload, MappingError> {
        let mut payload = ExternalTaskPayload::new();
        for entry in self.entries() {
            if let Some(value) = entry.external_value(task)? {
                payload.insert(entry.external_field, value);
            }
        }
        Ok(payload)
    }

    /// Convert a payload into per-field candidates. Whether a candidate
    /// replaces the value in `existing` is the reconciler's decision.
    fn to_internal(&self, payload: &ExternalTaskPayload, existing: &TaskRecord) -> TaskCandidate {
        let fields = self
            .entries()
            .iter()
            .map(|entry| {
                let candidate = match entry.internal_value(payload, existing) {
                    Ok(Some(value)) => CandidateValue::Value(value),
                    Ok(None) => CandidateValue::Absent,
                    Err(e) => CandidateValue::Failed(e),
                };
                (entry.internal_field, candidate)
            })
            .collect();
        TaskCandidate { fields }
    }
}

/// Check that every internal field appears at most once.
pub fn validate_entries(entries: &[FieldMappingEntry]) -> SyncResult<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.internal_field) {
            return Err(SyncError::DuplicateMapping(entry.internal_field));
        }
    }
    Ok(())
}

/// Inbound value for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateValue {
    /// The payload did not carry the field this round.
    Absent,
    /// A value to consider, possibly an explicit `Null`.
    Value(FieldValue),
    /// The transform failed hard.
    Failed(MappingError),
}

/// A partial task derived from a payload, in mapping table order.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCandidate {
    fields: Vec<(TaskField, CandidateValue)>,
}

impl TaskCandidate {
    pub fn get(&self, field: TaskField) -> Option<&CandidateValue> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
    }

    /// The candidate value if the payload carried one.
    pub fn value(&self, field: TaskField) -> Option<&FieldValue> {
        match self.get(field) {
            Some(CandidateValue::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskField, &CandidateValue)> {
        self.fields.iter().map(|(f, c)| (*f, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::mapping::Inbound;
    use serde_json::json;

    fn reject(_: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
        Err(TransformError::new("nope"))
    }

    fn omit(_: &FieldValue) -> Result<Option<Value>, TransformError> {
        Ok(None)
    }

    static ENTRIES: [FieldMappingEntry; 4] = [
        FieldMappingEntry::new(TaskField::Title, "title"),
        FieldMappingEntry::new(TaskField::DueDate, "due"),
        FieldMappingEntry::new(TaskField::Status, "state").with_to_internal(reject),
        FieldMappingEntry::new(TaskField::Priority, "priority")
            .preserve_local()
            .with_to_external(omit),
    ];

    struct Sample;

    impl FieldMapper for Sample {
        fn provider(&self) -> ProviderKind {
            ProviderKind::Google
        }

        fn entries(&self) -> &[FieldMappingEntry] {
            &ENTRIES
        }
    }

    #[test]
    fn test_to_external_writes_nulls_and_skips_omitted() {
        let mut task = TaskRecord::new("t1", "Title");
        task.priority = Some(1);

        let payload = Sample.to_external(&task).unwrap();
        assert_eq!(payload.get("title"), Some(&json!("Title")));
        assert_eq!(payload.get("due"), Some(&Value::Null));
        assert_eq!(payload.get("state"), Some(&json!("TODO")));
        assert!(!payload.contains_key("priority"));
        assert_eq!(payload.len(), 3);
    }

    #[test]
    fn test_to_internal_distinguishes_absent_null_and_failed() {
        let task = TaskRecord::new("t1", "Title");
        let payload = ExternalTaskPayload::from_value(json!({"due": null})).unwrap();

        let candidate = Sample.to_internal(&payload, &task);
        assert_eq!(candidate.get(TaskField::Title), Some(&CandidateValue::Absent));
        assert_eq!(candidate.value(TaskField::DueDate), Some(&FieldValue::Null));
        assert!(matches!(
            candidate.get(TaskField::Status),
            Some(CandidateValue::Failed(e)) if e.field == TaskField::Status
        ));
        assert_eq!(candidate.get(TaskField::Tags), None);
    }

    #[test]
    fn test_validate_entries_rejects_duplicates() {
        assert!(Sample.validate_entries().is_ok());

        let doubled = [
            FieldMappingEntry::new(TaskField::Title, "title"),
            FieldMappingEntry::new(TaskField::Title, "name"),
        ];
        assert!(matches!(
            validate_entries(&doubled),
            Err(SyncError::DuplicateMapping(TaskField::Title))
        ));
    }
}
