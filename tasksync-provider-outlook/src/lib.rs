//! Microsoft To Do field mapper for tasksync.
//!
//! Works on Graph `todoTask` resources:
//!
//! ```json
//! {
//!   "id": "AAMkAGI2...",
//!   "title": "Prepare slides",
//!   "body": { "content": "For Monday", "contentType": "text" },
//!   "status": "inProgress",
//!   "importance": "high",
//!   "dueDateTime": { "dateTime": "2024-01-05T09:00:00.0000000", "timeZone": "Europe/Berlin" },
//!   "completedDateTime": null,
//!   "categories": ["work"]
//! }
//! ```

mod from_outlook;
mod to_outlook;

use tasksync_core::{FieldMapper, FieldMappingEntry, ProviderKind, TaskField};

static ENTRIES: [FieldMappingEntry; 7] = [
    FieldMappingEntry::new(TaskField::Title, "title"),
    FieldMappingEntry::new(TaskField::Description, "body")
        .with_to_external(to_outlook::body)
        .with_to_internal(from_outlook::body),
    FieldMappingEntry::new(TaskField::Status, "status")
        .with_to_external(to_outlook::status)
        .with_to_internal(from_outlook::status),
    FieldMappingEntry::new(TaskField::DueDate, "dueDateTime")
        .with_to_external(to_outlook::date_time)
        .with_to_internal(from_outlook::date_time),
    FieldMappingEntry::new(TaskField::CompletedAt, "completedDateTime")
        .with_to_external(to_outlook::date_time)
        .with_to_internal(from_outlook::date_time),
    FieldMappingEntry::new(TaskField::Priority, "importance")
        .with_to_external(to_outlook::importance)
        .with_to_internal(from_outlook::importance),
    FieldMappingEntry::new(TaskField::Tags, "categories")
        .with_to_internal(from_outlook::categories),
];

static PROVIDER_OWNED: [TaskField; 1] = [TaskField::CompletedAt];

#[derive(Debug, Clone, Copy, Default)]
pub struct OutlookTasksMapper;

impl FieldMapper for OutlookTasksMapper {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Outlook
    }

    fn entries(&self) -> &[FieldMappingEntry] {
        &ENTRIES
    }

    fn provider_owned(&self) -> &[TaskField] {
        &PROVIDER_OWNED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use tasksync_core::{
        ExternalTaskPayload, FieldDecision, FieldValue, Reconciler, TaskRecord, TaskStatus,
    };

    fn task() -> TaskRecord {
        let mut task =
            TaskRecord::new("local-7", "Prepare slides").linked(ProviderKind::Outlook, "o-7");
        task.description = Some("For Monday".into());
        task.status = TaskStatus::InProgress;
        task.due_date = Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap());
        task.priority = Some(1);
        task.tags = vec!["work".into()];
        task
    }

    fn payload(value: Value) -> ExternalTaskPayload {
        ExternalTaskPayload::from_value(value).unwrap()
    }

    #[test]
    fn test_table_has_one_entry_per_field() {
        assert!(OutlookTasksMapper.validate_entries().is_ok());
        assert_eq!(OutlookTasksMapper.entries().len(), TaskField::ALL.len());
    }

    #[test]
    fn test_to_external_builds_nested_objects() {
        let out = OutlookTasksMapper.to_external(&task()).unwrap();

        assert_eq!(
            out.get("body"),
            Some(&json!({"content": "For Monday", "contentType": "text"}))
        );
        assert_eq!(out.get("status"), Some(&json!("inProgress")));
        assert_eq!(
            out.get("dueDateTime"),
            Some(&json!({"dateTime": "2024-01-05T08:00:00.0000000", "timeZone": "UTC"}))
        );
        assert_eq!(out.get("completedDateTime"), Some(&Value::Null));
        assert_eq!(out.get("importance"), Some(&json!("high")));
        assert_eq!(out.get("categories"), Some(&json!(["work"])));
    }

    #[test]
    fn test_own_payload_round_trips_unchanged() {
        let t = task();
        let out = OutlookTasksMapper.to_external(&t).unwrap();

        let outcome = Reconciler::new(&OutlookTasksMapper)
            .reconcile(&t, &out, None)
            .unwrap();

        assert_eq!(outcome.task, t);
        assert!(
            outcome
                .decisions
                .iter()
                .all(|o| o.decision == FieldDecision::Unchanged)
        );
    }

    #[test]
    fn test_date_time_has_seven_digit_fraction() {
        let mut t = task();
        t.due_date = Some(
            Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap()
                + chrono::Duration::nanoseconds(123_456_789),
        );
        t.completed_at = Some(Utc.with_ymd_and_hms(2024, 1, 6, 10, 30, 15).unwrap());

        let out = OutlookTasksMapper.to_external(&t).unwrap();
        assert_eq!(
            out.get("dueDateTime"),
            Some(&json!({"dateTime": "2024-01-05T08:00:00.1234567", "timeZone": "UTC"}))
        );
        assert_eq!(
            out.get("completedDateTime"),
            Some(&json!({"dateTime": "2024-01-06T10:30:15.0000000", "timeZone": "UTC"}))
        );
    }

    #[test]
    fn test_task_without_priority_settles() {
        let mut t = task();
        t.priority = None;
        let out = OutlookTasksMapper.to_external(&t).unwrap();
        assert_eq!(out.get("importance"), Some(&json!("normal")));

        let reconciler = Reconciler::new(&OutlookTasksMapper);
        let outcome = reconciler.reconcile(&t, &out, None).unwrap();
        assert_eq!(outcome.task.priority, None);
        assert_eq!(
            outcome.decision(TaskField::Priority),
            Some(&FieldDecision::Unchanged)
        );

        let outcome = reconciler.reconcile(&t, &out, Some(&out)).unwrap();
        assert_eq!(outcome.task, t);
        assert!(!outcome.needs_push());
    }

    #[test]
    fn test_normal_importance_sets_priority_when_local_differs() {
        let mut t = task();
        t.priority = Some(1);
        let c = OutlookTasksMapper.to_internal(&payload(json!({"importance": "normal"})), &t);
        assert_eq!(c.value(TaskField::Priority), Some(&FieldValue::Priority(2)));

        t.priority = None;
        let c = OutlookTasksMapper.to_internal(&payload(json!({"importance": "low"})), &t);
        assert_eq!(c.value(TaskField::Priority), Some(&FieldValue::Priority(3)));
    }

    #[test]
    fn test_missing_status_keeps_local_status() {
        let mut t = task();
        t.status = TaskStatus::Completed;
        let c = OutlookTasksMapper.to_internal(&payload(json!({"title": "Prepare slides"})), &t);
        assert_eq!(c.value(TaskField::Status), None);

        let outcome = Reconciler::new(&OutlookTasksMapper)
            .reconcile(&t, &payload(json!({"title": "Prepare slides"})), None)
            .unwrap();
        assert_eq!(outcome.task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_due_date_time_zone_is_applied() {
        let remote = payload(json!({
            "dueDateTime": {"dateTime": "2024-01-05T09:00:00.0000000", "timeZone": "Europe/Berlin"}
        }));
        let c = OutlookTasksMapper.to_internal(&remote, &task());
        assert_eq!(
            c.value(TaskField::DueDate),
            Some(&FieldValue::Timestamp(
                Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap()
            ))
        );
    }

    #[test]
    fn test_unknown_time_zone_keeps_local_due() {
        let t = task();
        let remote = payload(json!({
            "dueDateTime": {"dateTime": "2024-02-01T09:00:00", "timeZone": "Mars/Olympus"}
        }));

        let outcome = Reconciler::new(&OutlookTasksMapper)
            .reconcile(&t, &remote, None)
            .unwrap();

        assert_eq!(outcome.task.due_date, t.due_date);
        assert!(matches!(
            outcome.decision(TaskField::DueDate),
            Some(FieldDecision::MappingFailed { .. })
        ));
    }

    #[test]
    fn test_malformed_nested_structures_are_absent() {
        let t = task();
        let remote = payload(json!({
            "body": "just a string",
            "dueDateTime": {"timeZone": "UTC"},
        }));

        let c = OutlookTasksMapper.to_internal(&remote, &t);
        assert_eq!(c.value(TaskField::Description), None);
        assert_eq!(c.value(TaskField::DueDate), None);

        let outcome = Reconciler::new(&OutlookTasksMapper)
            .reconcile(&t, &remote, None)
            .unwrap();
        assert_eq!(outcome.task.description, t.description);
        assert_eq!(outcome.task.due_date, t.due_date);
    }

    #[test]
    fn test_status_values() {
        let t = TaskRecord::new("x", "x");
        let cases = [
            ("notStarted", TaskStatus::Todo),
            ("deferred", TaskStatus::Todo),
            ("INPROGRESS", TaskStatus::InProgress),
            ("waitingOnOthers", TaskStatus::InProgress),
            ("completed", TaskStatus::Completed),
            ("finished", TaskStatus::Todo),
        ];
        for (raw, expected) in cases {
            let c = OutlookTasksMapper.to_internal(&payload(json!({"status": raw})), &t);
            assert_eq!(
                c.value(TaskField::Status),
                Some(&FieldValue::Status(expected)),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_importance_keeps_finer_local_priority() {
        let mut t = task();
        t.priority = Some(5);

        let c = OutlookTasksMapper.to_internal(&payload(json!({"importance": "low"})), &t);
        assert_eq!(c.value(TaskField::Priority), Some(&FieldValue::Priority(5)));

        let c = OutlookTasksMapper.to_internal(&payload(json!({"importance": "High"})), &t);
        assert_eq!(c.value(TaskField::Priority), Some(&FieldValue::Priority(1)));

        let c = OutlookTasksMapper.to_internal(&payload(json!({"importance": "urgent"})), &t);
        assert!(matches!(
            c.get(TaskField::Priority),
            Some(tasksync_core::CandidateValue::Failed(_))
        ));
    }

    #[test]
    fn test_categories_are_deduplicated() {
        let c = OutlookTasksMapper.to_internal(
            &payload(json!({"categories": ["work", "home", "work"]})),
            &task(),
        );
        assert_eq!(
            c.value(TaskField::Tags),
            Some(&FieldValue::Tags(vec!["work".into(), "home".into()]))
        );
    }

    #[test]
    fn test_completion_conflict_goes_to_outlook() {
        let mut t = task();
        t.completed_at = Some(Utc.with_ymd_and_hms(2024, 1, 6, 10, 0, 0).unwrap());
        let snapshot = payload(json!({"id": "o-7", "completedDateTime": null}));
        let remote = payload(json!({
            "id": "o-7",
            "completedDateTime": {"dateTime": "2024-01-06T12:00:00.0000000", "timeZone": "UTC"},
        }));

        let outcome = Reconciler::new(&OutlookTasksMapper)
            .reconcile(&t, &remote, Some(&snapshot))
            .unwrap();

        assert_eq!(
            outcome.task.completed_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap())
        );
    }
}
