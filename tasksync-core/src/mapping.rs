//! Declarative field mapping entries.
//!
//! A provider describes its schema as a `static` table of
//! `FieldMappingEntry` values. Each entry pairs one internal field with the
//! external key it is written under, plus optional transforms for each
//! direction. Transforms are plain `fn` pointers: they carry no state and
//! the table can be shared freely between threads.

use std::fmt;

use serde_json::Value;

use crate::error::{MappingError, TransformError};
use crate::field::{FieldValue, TaskField};
use crate::payload::ExternalTaskPayload;
use crate::task::TaskRecord;

/// Everything an inbound transform may look at.
pub struct Inbound<'a> {
    /// `payload[external_field]`, `None` if the key is missing.
    pub raw: Option<&'a Value>,
    /// The whole payload, for renamed or nested source keys.
    pub payload: &'a ExternalTaskPayload,
    /// The local record being reconciled, for lossy conversions that
    /// need to know what was there before.
    pub existing: &'a TaskRecord,
}

/// Internal value to external JSON. `Ok(None)` omits the key.
pub type ToExternalFn = fn(&FieldValue) -> Result<Option<Value>, TransformError>;

/// External JSON to internal value. `Ok(None)` means the payload did not
/// carry the field.
pub type ToInternalFn = fn(&Inbound<'_>) -> Result<Option<FieldValue>, TransformError>;

#[derive(Clone, Copy)]
pub struct FieldMappingEntry {
    pub internal_field: TaskField,
    pub external_field: &'static str,
    /// The provider never overwrites this field during an inbound merge.
    pub preserve_local_value: bool,
    pub to_external: Option<ToExternalFn>,
    pub to_internal: Option<ToInternalFn>,
}

impl FieldMappingEntry {
    pub const fn new(internal_field: TaskField, external_field: &'static str) -> Self {
        FieldMappingEntry {
            internal_field,
            external_field,
            preserve_local_value: false,
            to_external: None,
            to_internal: None,
        }
    }

    pub const fn preserve_local(mut self) -> Self {
        self.preserve_local_value = true;
        self
    }

    pub const fn with_to_external(mut self, f: ToExternalFn) -> Self {
        self.to_external = Some(f);
        self
    }

    pub const fn with_to_internal(mut self, f: ToInternalFn) -> Self {
        self.to_internal = Some(f);
        self
    }

    /// Outbound value for this entry, `None` if the key should be omitted.
    pub fn external_value(&self, task: &TaskRecord) -> Result<Option<Value>, MappingError> {
        let value = task.get(self.internal_field);
        match self.to_external {
            Some(transform) => {
                transform(&value).map_err(|e| MappingError::new(self.internal_field, e))
            }
            None => Ok(Some(value.to_json())),
        }
    }

    /// Inbound candidate for this entry, `None` if the payload did not
    /// carry the field.
    pub fn internal_value(
        &self,
        payload: &ExternalTaskPayload,
        existing: &TaskRecord,
    ) -> Result<Option<FieldValue>, MappingError> {
        let raw = payload.get(self.external_field);
        let result = match self.to_internal {
            Some(transform) => transform(&Inbound {
                raw,
                payload,
                existing,
            }),
            None => raw
                .map(|v| FieldValue::from_json(self.internal_field, v))
                .transpose(),
        };
        result.map_err(|e| MappingError::new(self.internal_field, e))
    }
}

impl fmt::Debug for FieldMappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMappingEntry")
            .field("internal_field", &self.internal_field)
            .field("external_field", &self.external_field)
            .field("preserve_local_value", &self.preserve_local_value)
            .field("to_external", &self.to_external.is_some())
            .field("to_internal", &self.to_internal.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shout(value: &FieldValue) -> Result<Option<Value>, TransformError> {
        match value {
            FieldValue::Text(s) => Ok(Some(Value::String(s.to_uppercase()))),
            _ => Ok(None),
        }
    }

    fn from_alias(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
        Ok(inbound
            .payload
            .get("alias")
            .and_then(Value::as_str)
            .map(|s| FieldValue::Text(s.to_string())))
    }

    #[test]
    fn test_pass_through_both_directions() {
        let entry = FieldMappingEntry::new(TaskField::Title, "name");
        let task = TaskRecord::new("t1", "Plain");

        assert_eq!(entry.external_value(&task).unwrap(), Some(json!("Plain")));

        let payload = ExternalTaskPayload::from_value(json!({"name": "Remote"})).unwrap();
        assert_eq!(
            entry.internal_value(&payload, &task).unwrap(),
            Some(FieldValue::Text("Remote".into()))
        );

        let empty = ExternalTaskPayload::new();
        assert_eq!(entry.internal_value(&empty, &task).unwrap(), None);
    }

    #[test]
    fn test_transforms_are_applied() {
        const ENTRY: FieldMappingEntry = FieldMappingEntry::new(TaskField::Title, "name")
            .with_to_external(shout)
            .with_to_internal(from_alias);
        let task = TaskRecord::new("t1", "quiet");

        assert_eq!(ENTRY.external_value(&task).unwrap(), Some(json!("QUIET")));

        let payload =
            ExternalTaskPayload::from_value(json!({"name": "ignored", "alias": "used"})).unwrap();
        assert_eq!(
            ENTRY.internal_value(&payload, &task).unwrap(),
            Some(FieldValue::Text("used".into()))
        );
    }

    #[test]
    fn test_pass_through_decode_failure_names_the_field() {
        let entry = FieldMappingEntry::new(TaskField::Priority, "priority");
        let task = TaskRecord::new("t1", "x");
        let payload = ExternalTaskPayload::from_value(json!({"priority": "urgent"})).unwrap();

        let err = entry.internal_value(&payload, &task).unwrap_err();
        assert_eq!(err.field, TaskField::Priority);
    }
}
