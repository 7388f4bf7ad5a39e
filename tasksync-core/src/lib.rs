//! Core types for tasksync.
//!
//! This crate provides the provider-neutral pieces shared by the CLI and
//! every provider mapper:
//! - `TaskRecord` and friends, the canonical local task
//! - `ExternalTaskPayload`, the opaque provider-shaped data
//! - `FieldMapper` and `FieldMappingEntry`, the per-provider mapping tables
//! - `sync`, the reconciliation orchestrator

pub mod error;
pub mod field;
pub mod mapper;
pub mod mapping;
pub mod payload;
pub mod sync;
pub mod task;
pub mod transforms;

pub use error::{MappingError, SchemaMismatchError, SyncError, SyncResult, TransformError};
pub use field::{FieldValue, TaskField};
pub use mapper::{CandidateValue, FieldMapper, TaskCandidate, validate_entries};
pub use mapping::{FieldMappingEntry, Inbound, ToExternalFn, ToInternalFn};
pub use payload::ExternalTaskPayload;
pub use sync::{
    ConflictResolution, FieldDecision, FieldOutcome, KeepReason, Reconciler, SyncInput,
    SyncOutcome, SyncPolicy,
};
pub use task::{ProviderKind, ProviderLink, TaskRecord, TaskStatus};
