//! Reconciliation of a local task with a fetched provider payload.

mod outcome;
mod policy;
mod reconcile;

pub use outcome::{FieldDecision, FieldOutcome, KeepReason, SyncOutcome};
pub use policy::{ConflictResolution, SyncPolicy};
pub use reconcile::{Reconciler, SyncInput};
