//! Error types for tasksync.

use serde::Serialize;
use thiserror::Error;

use crate::field::TaskField;
use crate::task::ProviderKind;

/// A single transform could not produce a value.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{0}")]
#[serde(transparent)]
pub struct TransformError(pub String);

impl TransformError {
    pub fn new(msg: impl Into<String>) -> Self {
        TransformError(msg.into())
    }
}

/// A transform failed for one field. Field-scoped: the rest of the
/// reconciliation carries on.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("Could not map field '{field}': {source}")]
pub struct MappingError {
    pub field: TaskField,
    #[source]
    pub source: TransformError,
}

impl MappingError {
    pub fn new(field: TaskField, source: TransformError) -> Self {
        MappingError { field, source }
    }
}

/// The external payload is structurally unusable.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("External payload is not usable: {reason}")]
pub struct SchemaMismatchError {
    pub reason: String,
}

impl SchemaMismatchError {
    pub fn new(reason: impl Into<String>) -> Self {
        SchemaMismatchError {
            reason: reason.into(),
        }
    }
}

/// Errors that are fatal for a single task's sync.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Task '{0}' is not linked to an external provider")]
    NotLinked(String),

    #[error("Task '{task}' is linked to {linked}, but the mapper handles {mapper}")]
    ProviderMismatch {
        task: String,
        linked: ProviderKind,
        mapper: ProviderKind,
    },

    #[error("Payload id '{found}' does not match external id '{expected}' of task '{task}'")]
    LinkMismatch {
        task: String,
        expected: String,
        found: String,
    },

    #[error("Field '{0}' is mapped more than once")]
    DuplicateMapping(TaskField),

    #[error("Unknown task field: {0}")]
    UnknownField(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
