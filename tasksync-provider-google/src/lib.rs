//! Google Tasks field mapper for tasksync.
//!
//! Google Tasks payloads look like:
//!
//! ```json
//! {
//!   "id": "MTIzNDU2Nzg5",
//!   "title": "Buy milk",
//!   "notes": "2 litres",
//!   "status": "needsAction",
//!   "due": "2024-01-05T00:00:00.000Z",
//!   "completed": null
//! }
//! ```
//!
//! Google has no notion of priority or tags; both stay local.

mod from_google;
mod to_google;

use tasksync_core::transforms;
use tasksync_core::{FieldMapper, FieldMappingEntry, ProviderKind, TaskField};

static ENTRIES: [FieldMappingEntry; 7] = [
    FieldMappingEntry::new(TaskField::Title, "title"),
    FieldMappingEntry::new(TaskField::Description, "description")
        .with_to_internal(from_google::description),
    FieldMappingEntry::new(TaskField::Status, "status")
        .with_to_external(to_google::status)
        .with_to_internal(from_google::status),
    FieldMappingEntry::new(TaskField::DueDate, "due")
        .with_to_external(transforms::timestamp_to_rfc3339)
        .with_to_internal(from_google::due),
    FieldMappingEntry::new(TaskField::CompletedAt, "completed")
        .with_to_external(transforms::timestamp_to_rfc3339)
        .with_to_internal(transforms::rfc3339_to_timestamp),
    FieldMappingEntry::new(TaskField::Priority, "priority")
        .preserve_local()
        .with_to_external(transforms::omit),
    FieldMappingEntry::new(TaskField::Tags, "tags")
        .preserve_local()
        .with_to_external(transforms::omit),
];

/// Google sets the completion time itself when a task is ticked off.
static PROVIDER_OWNED: [TaskField; 1] = [TaskField::CompletedAt];

#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleTasksMapper;

impl FieldMapper for GoogleTasksMapper {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn entries(&self) -> &[FieldMappingEntry] {
        &ENTRIES
    }

    fn provider_owned(&self) -> &[TaskField] {
        &PROVIDER_OWNED
    }
}
