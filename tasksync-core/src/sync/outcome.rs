//! Result of one reconciliation pass.

use std::fmt;

use serde::Serialize;

use crate::error::MappingError;
use crate::field::{FieldValue, TaskField};
use crate::sync::policy::ConflictResolution;
use crate::task::TaskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepReason {
    /// The field is local-only for this provider.
    LocalOnly,
    /// The payload did not carry the field.
    NotInPayload,
    /// Changed locally since the last sync, unchanged on the provider.
    LocalEdit,
}

/// How one field was settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum FieldDecision {
    Unchanged,
    KeptLocal {
        reason: KeepReason,
    },
    AdoptedExternal {
        value: FieldValue,
    },
    /// Adopted through the entry's inbound transform.
    Transformed {
        value: FieldValue,
    },
    Conflict {
        local: FieldValue,
        external: FieldValue,
        resolution: ConflictResolution,
    },
    MappingFailed {
        error: MappingError,
    },
}

impl FieldDecision {
    /// Whether the merged record took the provider's value.
    pub fn adopted(&self) -> bool {
        matches!(
            self,
            FieldDecision::AdoptedExternal { .. }
                | FieldDecision::Transformed { .. }
                | FieldDecision::Conflict {
                    resolution: ConflictResolution::ExternalWins,
                    ..
                }
        )
    }

    /// Whether the merged record holds a local value the provider lacks.
    pub fn local_ahead(&self) -> bool {
        matches!(
            self,
            FieldDecision::KeptLocal {
                reason: KeepReason::LocalEdit
            } | FieldDecision::Conflict {
                resolution: ConflictResolution::LocalWins,
                ..
            }
        )
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            FieldDecision::Conflict {
                resolution: ConflictResolution::Unresolved,
                ..
            }
        )
    }
}

impl fmt::Display for FieldDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDecision::Unchanged => write!(f, "unchanged"),
            FieldDecision::KeptLocal { reason } => match reason {
                KeepReason::LocalOnly => write!(f, "kept local (local-only field)"),
                KeepReason::NotInPayload => write!(f, "kept local (not in payload)"),
                KeepReason::LocalEdit => write!(f, "kept local (edited since last sync)"),
            },
            FieldDecision::AdoptedExternal { value } => write!(f, "adopted {value}"),
            FieldDecision::Transformed { value } => write!(f, "adopted {value} (transformed)"),
            FieldDecision::Conflict {
                local,
                external,
                resolution,
            } => write!(f, "conflict: local {local} vs external {external}, {resolution}"),
            FieldDecision::MappingFailed { error } => write!(f, "kept local ({error})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOutcome {
    pub field: TaskField,
    #[serde(flatten)]
    pub decision: FieldDecision,
}

/// The merged task plus the per-field decision trace, in mapping table
/// order. Nothing is persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub task: TaskRecord,
    pub decisions: Vec<FieldOutcome>,
}

impl SyncOutcome {
    pub fn decision(&self, field: TaskField) -> Option<&FieldDecision> {
        self.decisions
            .iter()
            .find(|o| o.field == field)
            .map(|o| &o.decision)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &FieldOutcome> {
        self.decisions
            .iter()
            .filter(|o| matches!(o.decision, FieldDecision::Conflict { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &MappingError> {
        self.decisions.iter().filter_map(|o| match &o.decision {
            FieldDecision::MappingFailed { error } => Some(error),
            _ => None,
        })
    }

    pub fn has_unresolved(&self) -> bool {
        self.decisions.iter().any(|o| o.decision.is_unresolved())
    }

    /// Local values the provider has not seen yet; the caller should send
    /// the outbound payload.
    pub fn needs_push(&self) -> bool {
        self.decisions.iter().any(|o| o.decision.local_ahead())
    }

    /// Fields whose merged value came from the provider.
    pub fn changed_fields(&self) -> Vec<TaskField> {
        self.decisions
            .iter()
            .filter(|o| o.decision.adopted())
            .map(|o| o.field)
            .collect()
    }
}
