//! Conflict resolution policy.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::TaskField;
use crate::mapper::FieldMapper;

/// What to do when both sides changed a field since the last sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    #[default]
    LocalWins,
    ExternalWins,
    /// Keep the local value but report the field so the user can decide.
    Unresolved,
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictResolution::LocalWins => write!(f, "local wins"),
            ConflictResolution::ExternalWins => write!(f, "external wins"),
            ConflictResolution::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Caller-supplied conflict policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPolicy {
    /// Used for fields with no explicit rule that the provider does not own.
    pub default: ConflictResolution,
    pub fields: BTreeMap<TaskField, ConflictResolution>,
}

impl SyncPolicy {
    pub fn with_default(mut self, resolution: ConflictResolution) -> Self {
        self.default = resolution;
        self
    }

    pub fn with_field(mut self, field: TaskField, resolution: ConflictResolution) -> Self {
        self.fields.insert(field, resolution);
        self
    }

    /// Explicit field rule, then provider ownership, then the default.
    pub fn resolution_for(&self, field: TaskField, mapper: &dyn FieldMapper) -> ConflictResolution {
        if let Some(resolution) = self.fields.get(&field) {
            return *resolution;
        }
        if mapper.provider_owned().contains(&field) {
            return ConflictResolution::ExternalWins;
        }
        self.default
    }
}
