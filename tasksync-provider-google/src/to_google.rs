use serde_json::Value;
use tasksync_core::transforms::unexpected;
use tasksync_core::{FieldValue, TaskStatus, TransformError};

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_NEEDS_ACTION: &str = "needsAction";

/// Google only knows "done" and "not done".
pub fn status(value: &FieldValue) -> Result<Option<Value>, TransformError> {
    match value {
        FieldValue::Status(TaskStatus::Completed) => Ok(Some(STATUS_COMPLETED.into())),
        FieldValue::Status(_) => Ok(Some(STATUS_NEEDS_ACTION.into())),
        other => Err(unexpected(other)),
    }
}
